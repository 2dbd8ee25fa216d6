use anyhow::Result;
use clap::Parser;
use question_paper_generator::cli::{Cli, Command};
use question_paper_generator::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let app = App::initialize(config).await?;

    match cli.command {
        None | Some(Command::Run) => {
            app.run().await?;
        }
        Some(Command::Extract { file, id }) => {
            app.extract_one(file, id).await?;
        }
        Some(command @ Command::Assemble { .. }) => {
            if let Some(request) = command.to_request() {
                app.assemble_one(request).await?;
            }
        }
    }

    Ok(())
}
