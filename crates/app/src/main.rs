use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use medscribe_app::config::Cli;
use medscribe_app::logging;
use medscribe_app::runtime::{ConsultationSession, SessionOptions};
use medscribe_export::{render_html, render_pages, render_text};
use medscribe_foundation::ShutdownHandler;
use medscribe_report::{BackendConfig, HttpBackend};
use medscribe_stt::providers::StdinProvider;
use medscribe_stt::ControllerState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging()?;

    let cli = Cli::parse();
    cli.validate()?;
    tracing::info!("Starting MedScribe console session (language: {})", cli.language);

    let backend = Arc::new(HttpBackend::new(BackendConfig {
        model: cli.model.clone(),
        ..BackendConfig::new(cli.endpoint.clone(), cli.api_key.clone())
    }));
    let provider = Arc::new(StdinProvider::new());

    let session = ConsultationSession::start(
        Arc::clone(&provider) as Arc<dyn medscribe_stt::SpeechProvider>,
        SessionOptions {
            language: cli.language.clone(),
            credits: cli.credits,
            backend,
        },
    );

    println!("Recording consultation. Type what is said, one utterance per line.");
    println!("Finish with Ctrl-D to generate the report, or Ctrl-C to cancel.");
    session.begin_recording().await;

    let shutdown = ShutdownHandler::new().install().await;
    let cancelled = loop {
        if provider.is_exhausted() || session.controller_state() == ControllerState::Stopped {
            break false;
        }
        tokio::select! {
            _ = shutdown.wait() => break true,
            _ = tokio::time::sleep(Duration::from_millis(200)) => {}
        }
    };

    session.stop_recording().await;

    if cancelled {
        println!("Consultation cancelled; no report generated.");
        session.shutdown().await;
        return Ok(());
    }

    let entries = session.transcript();
    println!("Recorded {} transcript entries.", entries.len());

    let details = cli.patient_details();
    let vitals = cli.patient_vitals();
    match session.generate(&details, &vitals).await {
        Ok((generated, snapshot)) => {
            if generated.used_fallback {
                println!("The model reply could not be parsed; a review-required report was produced.");
            }
            let report = &generated.report;

            std::fs::create_dir_all(&cli.out_dir)?;
            let text_path = cli.out_dir.join(format!("prescription-{}.txt", report.id));
            std::fs::write(&text_path, render_text(report, &snapshot))?;

            let pages_path = cli.out_dir.join(format!("prescription-{}.print.txt", report.id));
            let doc = render_pages(report, &snapshot);
            std::fs::write(&pages_path, doc.to_lines().join("\n"))?;

            let html_path = cli.out_dir.join(format!("prescription-{}.html", report.id));
            std::fs::write(&html_path, render_html(report, &snapshot))?;

            println!("Prescription report {} written to:", report.id);
            println!("  {}", text_path.display());
            println!("  {}", pages_path.display());
            println!("  {}", html_path.display());
            println!(
                "Credits remaining: {}",
                session.credits().remaining()
            );
        }
        Err(e) => {
            // Transcript and session state survive a failed attempt; the
            // user may rerun generation without re-recording.
            tracing::error!(target: "app", "report generation failed: {e}");
            eprintln!("{e}");
            session.shutdown().await;
            return Err(e.into());
        }
    }

    session.shutdown().await;
    Ok(())
}
