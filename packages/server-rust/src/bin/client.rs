//! `calculadora-client`: calls a Calculadora server from the command line.

use calculadora_server::telemetry::{init_tracing, LogFormat};
use calculadora_server::{CalculadoraClient, ClientError};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "calculadora-client", version, about = "Calculadora HTTP client")]
struct Cli {
    /// Base URL of the operation endpoints.
    #[arg(
        long,
        env = "CALCULADORA_URL",
        default_value = "http://localhost:8080/operation"
    )]
    base_url: String,

    /// Log output format.
    #[arg(long, env = "CALCULADORA_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs one operation.
    #[command(allow_negative_numbers = true)]
    Calc {
        /// soma, subtracao, multiplicacao or divisao.
        operation: String,
        param1: f64,
        param2: f64,
    },
    /// Runs a fixed sequence of operations, ending with a division by zero.
    Demo,
}

const DEMO: [(&str, &str, f64, f64); 5] = [
    ("soma", "+", 5.0, 3.0),
    ("subtracao", "-", 10.0, 4.0),
    ("multiplicacao", "*", 6.0, 7.0),
    ("divisao", "/", 20.0, 4.0),
    ("divisao", "/", 20.0, 0.0),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let client = CalculadoraClient::new(cli.base_url)?;

    match cli.command {
        Command::Calc {
            operation,
            param1,
            param2,
        } => {
            let result = client.execute(&operation, param1, param2).await?;
            println!("{result}");
        }
        Command::Demo => {
            for (name, symbol, a, b) in DEMO {
                match client.execute(name, a, b).await {
                    Ok(result) => println!("{a} {symbol} {b} = {result}"),
                    Err(ClientError::InvalidArgument(err)) => println!("{a} {symbol} {b}: {err}"),
                    Err(err) => eprintln!("{a} {symbol} {b}: {err}"),
                }
            }
        }
    }
    Ok(())
}
