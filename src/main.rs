use anyhow::Context;
use vitrine_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load vitrine settings")?;
    vitrine_telemetry::init(&settings.telemetry)?;

    vitrine_app::run(settings).await
}
