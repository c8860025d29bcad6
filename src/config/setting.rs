use core::ops::RangeInclusive;
use core::str::{FromStr, Split};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    UnknownKey,
    InvalidValue,
    OutOfRange,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let err_string = match self {
            Self::UnknownKey => "No such configuration key",
            Self::InvalidValue => "Value does not parse",
            Self::OutOfRange => "Value out of range",
        };
        write!(f, "{}", err_string)
    }
}

/// A single `key.path=value` override, consumed key by key while descending the tree.
#[derive(Clone, Debug)]
pub struct Setting<'a> {
    keys: Split<'a, char>,
    value: &'a str,
}

impl<'a> Setting<'a> {
    pub fn new(path: &'a str, value: &'a str) -> Self {
        Self { keys: path.split('.'), value: value.trim() }
    }

    pub fn key(&mut self) -> Result<&'a str, Error> {
        self.keys.next().filter(|key| !key.is_empty()).ok_or(Error::UnknownKey)
    }

    /// Next key as a position in a table of `len` entries
    pub fn index(&mut self, len: usize) -> Result<usize, Error> {
        match self.key()?.parse::<usize>() {
            Ok(index) if index < len => Ok(index),
            _ => Err(Error::UnknownKey),
        }
    }

    /// Leaf value, keys left over after the leaf name an unknown key.
    pub fn value<T: FromStr>(&mut self) -> Result<T, Error> {
        if self.keys.next().is_some() {
            return Err(Error::UnknownKey);
        }
        self.value.parse().map_err(|_| Error::InvalidValue)
    }

    pub fn value_in<T: FromStr + PartialOrd>(
        &mut self,
        range: RangeInclusive<T>,
    ) -> Result<T, Error> {
        let value = self.value()?;
        match range.contains(&value) {
            true => Ok(value),
            false => Err(Error::OutOfRange),
        }
    }
}

pub trait Configure {
    fn configure(&mut self, setting: Setting) -> Result<(), Error>;
}

mod test {
    #[test]
    fn test_walk_keys() {
        use super::{Error, Setting};

        let mut setting = Setting::new("pwm.bindings.2.pin", " 13 ");
        assert_eq!(setting.key(), Ok("pwm"));
        assert_eq!(setting.key(), Ok("bindings"));
        assert_eq!(setting.clone().index(2), Err(Error::UnknownKey));
        assert_eq!(setting.index(4), Ok(2));
        assert_eq!(setting.key(), Ok("pin"));
        assert_eq!(setting.value::<u8>(), Ok(13));
        assert_eq!(setting.key(), Err(Error::UnknownKey));
    }

    #[test]
    fn test_value() {
        use super::{Error, Setting};

        let leaf = |value: &'static str| {
            let mut setting = Setting::new("leaf", value);
            setting.key().map(|_| setting)
        };
        assert_eq!(Setting::new("", "1").key(), Err(Error::UnknownKey));
        assert_eq!(leaf("x").unwrap().value::<u8>(), Err(Error::InvalidValue));
        assert_eq!(leaf("300").unwrap().value::<u8>(), Err(Error::InvalidValue));
        assert_eq!(leaf("17").unwrap().value_in(1u8..=16), Err(Error::OutOfRange));
        assert_eq!(leaf("16").unwrap().value_in(1u8..=16), Ok(16));
        assert_eq!(Setting::new("leaf", "16").value::<u8>(), Err(Error::UnknownKey));
    }
}
