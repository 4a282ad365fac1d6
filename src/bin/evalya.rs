use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use evalya_smart::alert::{LogNotifier, Notifier};
use evalya_smart::config::ClientOptions;
use evalya_smart::download::Platform;
use evalya_smart::screens::{
    HomeworkListScreen, LoginScreen, PasswordRecoveryScreen, SubmissionHistoryScreen, SubmissionScreen,
};
use evalya_smart::storage::PathChooser;
use evalya_smart::Evalya;

#[derive(Parser, Debug)]
#[command(name = "evalya", version, about = "Evalya Smart homework client")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "EVALYA_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login { email: String, password: String },
    /// Ask for a new password by email
    ForgotPassword { email: String },
    /// List published homework
    Homeworks,
    /// List past submissions
    Submissions,
    /// Hand in a file
    Submit { file: PathBuf },
    /// Download a file by URL
    Download { url: String, file_name: String },
    /// Forget the stored session
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut options = match ClientOptions::from_env() {
        Ok(options) => options,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(base_url) = &cli.base_url {
        options = options.with_base_url(base_url);
    }

    let evalya = match Evalya::new(options) {
        Ok(evalya) => evalya,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if run(&evalya, cli.command).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(evalya: &Evalya, command: Command) -> bool {
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    match command {
        Command::Login { email, password } => {
            let screen = LoginScreen::new(evalya.auth().clone());
            match screen.submit(&email, &password).await {
                Some(route) => {
                    info!("Connecté, destination: {:?}", route);
                    true
                }
                None => {
                    error!("{}", screen.error().unwrap_or_default());
                    false
                }
            }
        }
        Command::ForgotPassword { email } => {
            let screen = PasswordRecoveryScreen::new(evalya.auth().clone());
            let sent = screen.submit(&email).await;
            if sent {
                info!("{}", screen.message().unwrap_or_default());
            } else {
                error!("{}", screen.error().unwrap_or_default());
            }
            sent
        }
        Command::Homeworks => {
            let downloads = evalya.download_strategy(Platform::current());
            let screen = HomeworkListScreen::new(evalya, downloads, notifier);
            let loaded = screen.load().await;
            for homework in screen.homeworks() {
                println!("{}\t{}\t{}", homework.id, homework.file_name, homework.file_url);
            }
            loaded
        }
        Command::Submissions => {
            let downloads = evalya.download_strategy(Platform::current());
            let screen = SubmissionHistoryScreen::new(evalya, downloads, notifier);
            let loaded = screen.load().await;
            for submission in screen.submissions() {
                println!(
                    "{}\t{}\t{}\t{}",
                    submission.id,
                    submission.file_name,
                    submission.submitted_on(),
                    submission.file_url
                );
            }
            loaded
        }
        Command::Submit { file } => {
            let screen = SubmissionScreen::new(evalya, PathChooser::new(file), notifier);
            if screen.pick_file().await.is_none() {
                return false;
            }
            match screen.submit().await {
                Some(receipt) => {
                    println!("{}\t{} octets\t{}", receipt.file_name, receipt.bytes, receipt.object_url);
                    true
                }
                None => false,
            }
        }
        Command::Download { url, file_name } => {
            let downloads = evalya.download_strategy(Platform::current());
            match downloads.download(&url, &file_name).await {
                Ok(outcome) => {
                    info!("Téléchargement terminé: {:?}", outcome);
                    true
                }
                Err(e) => {
                    error!("Échec du téléchargement: {}", e);
                    false
                }
            }
        }
        Command::Logout => match evalya.auth().logout().await {
            Ok(()) => {
                info!("Déconnecté");
                true
            }
            Err(e) => {
                error!("Logout failed: {}", e);
                false
            }
        },
    }
}
