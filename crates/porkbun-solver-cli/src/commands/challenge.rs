use anyhow::Context;
use clap::Args;
use porkbun_solver::providers::PORKBUN_API_BASE;
use porkbun_solver::{
    ChallengeRequest, ChallengeSolver, PorkbunSolver, SolverContext, SolverSettings,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bootstrap settings shared by every command
#[derive(Args)]
pub struct SolverArgs {
    /// Directory of secret manifests, laid out as <dir>/<namespace>/<name>.yaml
    #[arg(
        long,
        env = "PORKBUN_SECRETS_DIR",
        default_value = "/etc/porkbun-solver/secrets",
        global = true
    )]
    pub secrets_dir: PathBuf,

    /// Porkbun API base URL
    #[arg(long, env = "PORKBUN_API_URL", default_value = PORKBUN_API_BASE, global = true)]
    pub api_url: String,
}

impl SolverArgs {
    pub fn settings(&self) -> SolverSettings {
        SolverSettings::new(self.secrets_dir.clone()).with_api_base_url(self.api_url.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeAction {
    Present,
    CleanUp,
}

#[derive(Args)]
pub struct ChallengeCommand {
    /// Challenge request JSON file, or "-" for stdin
    #[arg(long, default_value = "-")]
    pub request: PathBuf,
}

fn read_request(source: &Path) -> anyhow::Result<ChallengeRequest> {
    let raw = if source == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read challenge request from stdin")?;
        raw
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read challenge request {}", source.display()))?
    };

    serde_json::from_str(&raw).context("invalid challenge request")
}

impl ChallengeCommand {
    pub fn execute(self, settings: SolverSettings, action: ChallengeAction) -> anyhow::Result<()> {
        let challenge = read_request(&self.request)?;

        debug!(
            "Using secrets from {} and API {}",
            settings.secrets_dir.display(),
            settings.api_base_url
        );

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let mut solver = PorkbunSolver::new();
            solver
                .initialize(SolverContext::from_settings(&settings))
                .await?;

            match action {
                ChallengeAction::Present => solver.present(&challenge).await?,
                ChallengeAction::CleanUp => solver.clean_up(&challenge).await?,
            }

            info!("{:?} finished for {}", action, challenge.resolved_fqdn);
            Ok::<(), anyhow::Error>(())
        })
    }
}
