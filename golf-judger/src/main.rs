use golf_judger::docker::DockerProvider;
use golf_judger::{hole, Config, Judger};
use golf_utils::tracing::setup_tracing;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use structopt::StructOpt;
use tracing::{error, info};

#[derive(Debug, StructOpt)]
#[structopt(name = "golf-judge", about = "Judges a code golf submission")]
struct Opt {
    #[structopt(long, default_value = "golf-judge.toml")]
    config: PathBuf,

    /// Print the bundled holes and languages, then exit.
    #[structopt(long)]
    list: bool,

    #[structopt(required_unless = "list")]
    hole: Option<String>,

    #[structopt(required_unless = "list")]
    lang: Option<String>,

    #[structopt(required_unless = "list")]
    script: Option<PathBuf>,
}

#[tracing::instrument(err)]
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        info!("{} not found, using defaults", path.display());
        return Ok(Config::default());
    }

    info!("loading config from {}", path.display());
    let config = Config::from_file(path)?;
    info!("config is loaded:\n{:#?}", config);

    Ok(config)
}

async fn run(opt: Opt) -> Result<bool> {
    let config = load_config(&opt.config)?;
    let provider = Arc::new(DockerProvider::new(&config.docker));
    let judger = Judger::new(&config, provider);

    let (hole, lang, script) = match (opt.hole, opt.lang, opt.script) {
        (Some(hole), Some(lang), Some(script)) if !opt.list => (hole, lang, script),
        _ => {
            println!("holes:");
            for name in hole::BUILTIN {
                println!("  {}", name);
            }
            println!("languages:");
            for name in judger.registry().names() {
                println!("  {}", name);
            }
            return Ok(true);
        }
    };

    let hole = hole::load(&hole)?;
    let verdict = judger.judge(&hole, &lang, &script).await?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    Ok(verdict.passed)
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    setup_tracing();

    let code = match run(Opt::from_args()).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            error!("{:?}", err);
            2
        }
    };
    process::exit(code);
}
