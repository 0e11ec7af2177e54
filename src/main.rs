use log::error;

fn main() {
    // RUST_LOG=info 로 프레임마다 렌더 시간 확인 가능
    env_logger::init();

    if let Err(err) = pathlight::run() {
        error!("{}", err);
        std::process::exit(1);
    }
}
