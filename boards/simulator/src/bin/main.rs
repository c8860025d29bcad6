#[macro_use]
extern crate log;

use std::io::Read;

use actix_web::{get, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use async_std::channel::{bounded, unbounded, Sender};
use env_logger::Env;
use nalgebra::{Quaternion, UnitQuaternion};
use serde::Deserialize;
use simulator::{Bench, Message, Simulator};
use tilt_copter::config::Config;
use tilt_copter::protocol::{command, Reply, Request};
use tilt_copter::types::sensor::Axes;

#[derive(Clone)]
struct State {
    sender: Sender<Message>,
    bench: Bench,
}

impl State {
    async fn request(&self, request: Request) -> Option<Reply> {
        let (reply, receiver) = bounded(1);
        self.sender.send(Message { request, reply }).await.ok()?;
        receiver.recv().await.ok()
    }
}

fn unavailable() -> HttpResponse {
    HttpResponse::InternalServerError().body("Control loop not running")
}

#[get("/data")]
async fn get_data(state: web::Data<State>) -> impl Responder {
    match state.request(Request::Orientation).await {
        Some(Reply::Orientation(attitude)) => {
            let body = attitude.to_json().as_str().to_owned();
            HttpResponse::Ok().content_type("application/json").body(body)
        }
        Some(Reply::NoSample) => HttpResponse::ServiceUnavailable().body("No sample yet"),
        _ => unavailable(),
    }
}

#[get("/recalibrate")]
async fn recalibrate(state: web::Data<State>) -> impl Responder {
    match state.request(Request::Recalibrate).await {
        Some(Reply::Ack) => HttpResponse::Ok().body("OK"),
        Some(Reply::CalibrationTimedOut) => {
            HttpResponse::GatewayTimeout().body("Calibration timed out")
        }
        _ => unavailable(),
    }
}

#[get("/setPWM")]
async fn set_pwm(state: web::Data<State>, request: HttpRequest) -> impl Responder {
    let duties = command::set_duty(request.query_string());
    match state.request(Request::SetDuty(duties)).await {
        Some(Reply::Ack) => HttpResponse::Ok().body("OK"),
        _ => unavailable(),
    }
}

#[get("/telemetry")]
async fn get_telemetry(state: web::Data<State>) -> impl Responder {
    match state.request(Request::Telemetry).await {
        Some(Reply::Telemetry(telemetry)) => HttpResponse::Ok().json(telemetry),
        _ => unavailable(),
    }
}

#[post("/sensors/accelerometer")]
async fn update_acceleration(state: web::Data<State>, axes: web::Json<Axes>) -> impl Responder {
    state.bench.inject_acceleration(*axes);
    HttpResponse::Ok()
}

#[derive(Copy, Clone, Debug, Deserialize)]
struct WXYZ {
    w: f32,
    x: f32,
    y: f32,
    z: f32,
}

#[post("/sensors/fusion")]
async fn update_quaternion(state: web::Data<State>, q: web::Json<WXYZ>) -> impl Responder {
    let quaternion = Quaternion::new(q.w, q.x, q.y, q.z);
    match UnitQuaternion::try_new(quaternion, f32::EPSILON) {
        Some(unit) => {
            state.bench.inject_quaternion(unit);
            HttpResponse::Ok().finish()
        }
        None => HttpResponse::BadRequest().body("Degenerated quaternion"),
    }
}

fn load_config<'a>(matches: &'a clap::ArgMatches<'a>) -> Result<Config, String> {
    let mut config = match matches.value_of("config") {
        Some(path) => {
            let mut file = std::fs::File::open(path)
                .map_err(|e| format!("Read config file {} failed: {}", path, e))?;
            let mut buffer = String::new();
            file.read_to_string(&mut buffer).map_err(|_| "Unable to read config-file")?;
            serde_json::from_str(&buffer).map_err(|e| format!("Malformed config: {}", e))?
        }
        None => Config::default(),
    };
    for setting in matches.values_of("set").into_iter().flatten() {
        let mut split = setting.splitn(2, '=');
        let (path, value) = (split.next().unwrap_or_default(), split.next().unwrap_or_default());
        config.set(path, value).map_err(|e| format!("{}: {}", setting, e))?;
    }
    if let Some(rate) = matches.value_of("rate") {
        let rate = rate.parse::<u16>().map_err(|_| format!("Rate not a number"))?;
        config.tick_ms = 1000 / rate.clamp(1, 1000);
    }
    Ok(config)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let matches = clap::App::new("simulator")
        .version("0.1")
        .author("qiuchengxuan")
        .about("Tilt-copter attitude and motor controller simulator")
        .arg(clap::Arg::with_name("listen").short("l").help("Listen address").takes_value(true))
        .arg(clap::Arg::with_name("config").long("config").help("Config file").takes_value(true))
        .arg(clap::Arg::with_name("rate").long("rate").help("Tick rate in Hz").takes_value(true))
        .arg(
            clap::Arg::with_name("set")
                .long("set")
                .help("Override config, e.g. imu.mode=fusion")
                .takes_value(true)
                .multiple(true),
        )
        .get_matches();
    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(error) => {
            println!("{}", error);
            return Ok(());
        }
    };

    let bench = Bench::default();
    let (sender, receiver) = unbounded();
    let mut simulator = Simulator::new(&config, bench.clone(), receiver);
    std::thread::spawn(move || {
        simulator.calibrate();
        simulator.run()
    });

    let listen = matches.value_of("listen").unwrap_or("127.0.0.1:8080");
    info!("Start listening on {}", listen);
    let state = State { sender, bench };
    let server = move || {
        App::new()
            .data(state.clone())
            .service(get_data)
            .service(recalibrate)
            .service(set_pwm)
            .service(get_telemetry)
            .service(update_acceleration)
            .service(update_quaternion)
    };
    if listen.starts_with("/") {
        HttpServer::new(server).bind_uds(listen)?.run().await
    } else {
        HttpServer::new(server).bind(listen)?.run().await
    }
}
