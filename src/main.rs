use clap::Parser;
use peppol_lookup::config::LogFormat;
use peppol_lookup::utils::error::ErrorSeverity;
use peppol_lookup::utils::{logger, validation::Validate};
use peppol_lookup::{CancellationToken, CliConfig, LookupReport, PeppolLookup, SmlResolution};

fn print_report(report: &LookupReport) {
    let host = match &report.sml {
        SmlResolution::Found(host) => host,
        SmlResolution::NotFound => {
            println!("Not a PEPPOL participant: {}", report.participant);
            return;
        }
    };

    println!("SMP hostname: {}", host);
    println!("\nSupported document identifiers:");
    for document_type in &report.document_types {
        println!("- {}", document_type);
    }

    println!("\nPEPPOL BIS Billing 3.0 Support:");
    if report.billing.invoice {
        println!("- Supports Invoice");
    }
    if report.billing.credit_note {
        println!("- Supports Credit Note");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    match config.log_format {
        LogFormat::Compact => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    let settings = match config.validate().and_then(|_| config.settings()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Resolved settings: {:?}", settings);

    let lookup = PeppolLookup::from_config(&settings)?;
    let participant = config.participant();

    // Ctrl-C 取消進行中的 DNS / HTTP 請求
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    match lookup.lookup(&participant, &cancel).await {
        Ok(report) => {
            if config.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Lookup failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 130, // 被使用者取消
                ErrorSeverity::Medium => 2, // 可重試
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
