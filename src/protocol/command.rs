use crate::config::pwm::NUM_CHANNELS;

/// Leading integer of `string`: optional whitespace and sign, then digits.
/// Anything unparsable yields 0, overflow saturates.
pub fn to_int(string: &str) -> i32 {
    let mut bytes = string.trim_start().bytes().peekable();
    let negative = bytes.peek() == Some(&b'-');
    if matches!(bytes.peek(), Some(&b'-') | Some(&b'+')) {
        bytes.next();
    }
    let mut value: i64 = 0;
    for byte in bytes.take_while(u8::is_ascii_digit) {
        value = (value * 10 + (byte - b'0') as i64).min(i32::MAX as i64 + 1);
    }
    let value = if negative { -value } else { value };
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Parses `m1=..&m2=..&m3=..&m4=..`, the first occurrence of a key wins.
pub fn set_duty(query: &str) -> [Option<i32>; NUM_CHANNELS] {
    let mut duties = [None; NUM_CHANNELS];
    for pair in query.split('&') {
        let mut split = pair.splitn(2, '=');
        let key = split.next().unwrap_or_default();
        let value = split.next().unwrap_or_default();
        let index = match key {
            "m1" => 0,
            "m2" => 1,
            "m3" => 2,
            "m4" => 3,
            _ => continue,
        };
        if duties[index].is_none() {
            duties[index] = Some(to_int(value));
        }
    }
    duties
}

mod test {
    #[test]
    fn test_to_int() {
        use super::to_int;

        assert_eq!(to_int("128"), 128);
        assert_eq!(to_int("-5"), -5);
        assert_eq!(to_int("+7"), 7);
        assert_eq!(to_int("  42"), 42);
        assert_eq!(to_int("12abc"), 12);
        assert_eq!(to_int("abc"), 0);
        assert_eq!(to_int(""), 0);
        assert_eq!(to_int("-"), 0);
        assert_eq!(to_int("99999999999"), i32::MAX);
        assert_eq!(to_int("-99999999999"), i32::MIN);
    }

    #[test]
    fn test_set_duty() {
        use super::set_duty;

        assert_eq!(set_duty("m1=300&m3=10"), [Some(300), None, Some(10), None]);
        assert_eq!(set_duty(""), [None; 4]);
        assert_eq!(set_duty("m2=&m4=fast"), [None, Some(0), None, Some(0)]);
        assert_eq!(set_duty("m0=1&m5=1&x=1&m2=4&m2=8"), [None, Some(4), None, None]);
        assert_eq!(set_duty("m01=200&m+2=100"), [None; 4]);
        assert_eq!(set_duty("M1=5&m1 =5&m3=6"), [None, None, Some(6), None]);
    }
}
