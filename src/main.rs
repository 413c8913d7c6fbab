use std::process::ExitCode;

fn main() -> ExitCode {
    // Load `.env` before the logger so `MVD_LOG` can be set there.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("MVD_LOG", "warn")).init();

    match mvdlib::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
