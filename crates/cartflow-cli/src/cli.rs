//! Command line definition. Every knob can come from the environment,
//! matching how deployments configure the bot.

use std::path::PathBuf;

use cartflow_browser::{CheckoutTarget, WarmupPlan};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "cartflow",
    version,
    about = "Profile-scored checkout automation"
)]
pub struct Cli {
    /// Event store snapshot path.
    #[arg(long, env = "CARTFLOW_STORE_PATH", default_value = "cartflow-events.json")]
    pub store_path: PathBuf,

    /// Run the browser headless.
    #[arg(long, env = "CARTFLOW_HEADLESS", default_value_t = true)]
    pub headless: bool,

    /// Browser session directory (profile state + artifacts).
    #[arg(long, env = "CARTFLOW_BROWSER_DIR")]
    pub browser_dir: Option<PathBuf>,

    /// Profiles to compare in one session.
    #[arg(long, env = "CARTFLOW_MAX_PROFILES", default_value_t = 3)]
    pub max_profiles: usize,

    /// Trials per profile.
    #[arg(long, env = "CARTFLOW_ITERATIONS", default_value_t = 1)]
    pub iterations: u32,

    /// Skip the warmup browsing phases.
    #[arg(long, env = "CARTFLOW_SKIP_WARMUP", default_value_t = false)]
    pub skip_warmup: bool,

    /// Telegram bot token; notifications are disabled without it.
    #[arg(long, env = "TELEGRAM_TOKEN")]
    pub telegram_token: Option<String>,

    /// Telegram chat to notify.
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Product page to check out.
    #[arg(
        long,
        env = "CARTFLOW_PRODUCT_URL",
        default_value = "https://store.example.com/product/phone-pro"
    )]
    pub product_url: String,

    /// Model option label.
    #[arg(long, env = "CARTFLOW_MODEL", default_value = "Phone Pro Max")]
    pub model: String,

    /// Storage option label.
    #[arg(long, env = "CARTFLOW_STORAGE", default_value = "1TB")]
    pub storage: String,

    /// Color option label.
    #[arg(long, env = "CARTFLOW_COLOR", default_value = "Natural Titanium")]
    pub color: String,

    /// Carrier option label.
    #[arg(long, env = "CARTFLOW_CARRIER", default_value = "Unlocked")]
    pub carrier: String,
}

impl Cli {
    pub fn target(&self) -> CheckoutTarget {
        CheckoutTarget {
            product_url: self.product_url.clone(),
            model: self.model.clone(),
            storage: self.storage.clone(),
            color: self.color.clone(),
            carrier: self.carrier.clone(),
        }
    }

    pub fn warmup_plan(&self) -> WarmupPlan {
        WarmupPlan {
            product_url: self.product_url.clone(),
            search_term: self.model.clone(),
            ..WarmupPlan::default()
        }
    }
}
