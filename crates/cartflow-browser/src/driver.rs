//! The driver seam and its Playwright-backed implementation.
//!
//! Plans execute in a short-lived Node process: the runner script launches
//! Chromium through Playwright, replays the plan with the embedded pacing,
//! and reports back through a marker line on stdout. Cookies and local
//! storage persist between plans via the context storage state, so one
//! logical browsing session spans the whole harness run.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use cartflow_models::Profile;
use cartflow_traits::ProfileHook;
use parking_lot::RwLock;
use serde_json::{Value, json};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::action::{ActionPlan, PlanOutcome};
use crate::pace::Pacing;

const RESULT_MARKER: &str = "__CARTFLOW_RESULT__=";

/// Executes action plans against a live page.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn run_plan(&self, plan: &ActionPlan) -> Result<PlanOutcome>;
}

/// Driver construction knobs.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub headless: bool,
    pub root_dir: PathBuf,
}

impl Default for DriverSettings {
    fn default() -> Self {
        let base = std::env::var("CARTFLOW_BROWSER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::current_dir()
                    .unwrap_or_else(|_| std::env::temp_dir())
                    .join(".cartflow-browser")
            });
        Self {
            headless: true,
            root_dir: base,
        }
    }
}

/// Availability of the Node/Playwright toolchain.
#[derive(Debug, Clone)]
pub struct RuntimeProbe {
    pub node_available: bool,
    pub node_version: Option<String>,
    pub playwright_available: bool,
    pub ready: bool,
    pub notes: Vec<String>,
}

/// Playwright-backed driver. One instance owns one browsing session
/// directory (profile storage state + screenshot artifacts).
pub struct PlaywrightDriver {
    settings: DriverSettings,
    profile_dir: PathBuf,
    artifacts_dir: PathBuf,
    pacing: RwLock<Pacing>,
}

impl PlaywrightDriver {
    pub fn new(settings: DriverSettings) -> Result<Self> {
        let profile_dir = settings.root_dir.join("profile");
        let artifacts_dir = settings.root_dir.join("artifacts");
        std::fs::create_dir_all(&profile_dir)
            .with_context(|| format!("creating {}", profile_dir.display()))?;
        std::fs::create_dir_all(&artifacts_dir)
            .with_context(|| format!("creating {}", artifacts_dir.display()))?;
        Ok(Self {
            settings,
            profile_dir,
            artifacts_dir,
            pacing: RwLock::new(Pacing::relaxed()),
        })
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing.read().clone()
    }

    pub fn set_pacing(&self, pacing: Pacing) {
        *self.pacing.write() = pacing;
    }

    /// Check whether Node and the Playwright package are usable.
    pub async fn probe() -> RuntimeProbe {
        let mut probe = RuntimeProbe {
            node_available: false,
            node_version: None,
            playwright_available: false,
            ready: false,
            notes: Vec::new(),
        };

        if let Ok(output) = run_node(&["--version".to_string()], 10).await
            && output.exit_code == 0
        {
            probe.node_available = true;
            probe.node_version = Some(output.stdout.trim().to_string());
        }

        if probe.node_available {
            let check = run_node(
                &[
                    "--input-type=module".to_string(),
                    "-e".to_string(),
                    "import('playwright').then(() => process.exit(0)).catch(() => process.exit(1));"
                        .to_string(),
                ],
                15,
            )
            .await;
            probe.playwright_available =
                check.map(|output| output.exit_code == 0).unwrap_or(false);
        }

        probe.ready = probe.node_available && probe.playwright_available;
        if !probe.node_available {
            probe
                .notes
                .push("Node.js not found. Install Node.js 20+ to drive the browser.".to_string());
        }
        if probe.node_available && !probe.playwright_available {
            probe
                .notes
                .push("Playwright npm package not found. Run: npm i -D playwright".to_string());
        }
        probe
    }

    fn build_runner(&self, plan: &ActionPlan, pacing: &Pacing) -> Result<String> {
        let run = json!({
            "headless": self.settings.headless,
            "profileDir": self.profile_dir.display().to_string(),
            "artifactsDir": self.artifacts_dir.display().to_string(),
        });
        Ok(RUNNER_TEMPLATE
            .replace("__PLAN_JSON__", &serde_json::to_string(plan)?)
            .replace("__PACE_JSON__", &serde_json::to_string(pacing)?)
            .replace("__RUN_JSON__", &run.to_string()))
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightDriver {
    async fn run_plan(&self, plan: &ActionPlan) -> Result<PlanOutcome> {
        let pacing = self.pacing();
        debug!(label = %plan.label, profile = %pacing.profile_name, "executing action plan");

        let script = self.build_runner(plan, &pacing)?;
        let staging = tempfile::Builder::new()
            .prefix("cartflow-runner-")
            .tempdir()?;
        let script_path = staging.path().join("plan.mjs");
        std::fs::write(&script_path, script)?;

        let started = Instant::now();
        let output = run_node(
            &[script_path.display().to_string()],
            plan.timeout_secs.max(1),
        )
        .await?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (logs, payload) = split_marker(&output.stdout);
        if !logs.is_empty() {
            debug!(label = %plan.label, runner_output = %logs.join("\n"));
        }

        let Some(payload) = payload else {
            bail!(
                "runner for '{}' produced no result (exit {}): {}",
                plan.label,
                output.exit_code,
                output.stderr.trim()
            );
        };

        let ok = payload
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let outputs = payload
            .get("outputs")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let error = payload
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(PlanOutcome {
            label: plan.label.clone(),
            ok,
            duration_ms,
            outputs,
            error,
        })
    }
}

#[async_trait]
impl ProfileHook for PlaywrightDriver {
    /// Publish the active profile's pacing into the driver. Subsequent
    /// plans embed it, and the runner exposes it to page scripts.
    async fn apply_profile(&self, profile: &Profile) -> Result<()> {
        let pacing = Pacing::from_profile(profile);
        info!(
            profile = %profile.name,
            multiplier = pacing.delay_multiplier,
            "applying profile pacing to browser session"
        );
        self.set_pacing(pacing);
        Ok(())
    }
}

struct NodeCapture {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

async fn run_node(args: &[String], timeout_secs: u64) -> Result<NodeCapture> {
    let mut command = Command::new("node");
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout(Duration::from_secs(timeout_secs), command.output()).await {
        Ok(result) => result?,
        Err(_) => bail!("node runner timed out after {timeout_secs} seconds"),
    };

    Ok(NodeCapture {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Separate runner log lines from the marker payload.
fn split_marker(stdout: &str) -> (Vec<String>, Option<Value>) {
    let mut payload = None;
    let mut logs = Vec::new();
    for line in stdout.lines() {
        match line.strip_prefix(RESULT_MARKER) {
            Some(rest) => {
                if let Ok(value) = serde_json::from_str::<Value>(rest.trim()) {
                    payload = Some(value);
                } else {
                    warn!("unparseable runner payload: {rest}");
                }
            }
            None => logs.push(line.to_string()),
        }
    }
    (logs, payload)
}

/// Screenshot helper used by flows that want a terminal artifact even when
/// the plan itself failed.
pub fn artifact_name(prefix: &str) -> String {
    format!("{prefix}-{}.png", uuid::Uuid::new_v4().simple())
}

const RUNNER_TEMPLATE: &str = r#"
import fs from 'node:fs';
import path from 'node:path';

const MARKER = '__CARTFLOW_RESULT__=';
const plan = __PLAN_JSON__;
const pace = __PACE_JSON__;
const run = __RUN_JSON__;

const emit = (success, outputs, error) => {
  process.stdout.write(MARKER + JSON.stringify({ success, outputs, error }) + '\n');
};
const sleep = (ms) => new Promise((resolve) => setTimeout(resolve, ms));
const pause = ([min, max]) => sleep(min + Math.random() * Math.max(0, max - min));

let chromium;
try {
  ({ chromium } = await import('playwright'));
} catch (error) {
  emit(false, [], String((error && error.stack) || error));
  process.exit(1);
}

await fs.promises.mkdir(run.profileDir, { recursive: true });
await fs.promises.mkdir(run.artifactsDir, { recursive: true });
const stateFile = path.join(run.profileDir, 'storage-state.json');

const browser = await chromium.launch({ headless: run.headless });
const context = await browser.newContext(
  fs.existsSync(stateFile) ? { storageState: stateFile } : {},
);
const page = await context.newPage();
await page.addInitScript((pace) => { window.__cartflowPace = pace; }, pace);

async function step(action) {
  const waitMs = action.timeout_ms ?? 10000;
  switch (action.type) {
    case 'navigate': {
      await page.goto(action.url, { waitUntil: 'load' });
      await pause(pace.page_load_wait_ms);
      return { type: action.type, url: action.url };
    }
    case 'click': {
      const locator = page.locator(action.selector).first();
      await locator.waitFor({ state: 'visible', timeout: waitMs });
      await locator.click();
      await pause(pace.action_delay_ms);
      return { type: action.type, selector: action.selector };
    }
    case 'fill': {
      const locator = page.locator(action.selector).first();
      await locator.waitFor({ state: 'visible', timeout: waitMs });
      await locator.fill(action.text);
      await pause(pace.action_delay_ms);
      return { type: action.type, selector: action.selector };
    }
    case 'type_text': {
      const locator = page.locator(action.selector).first();
      await locator.waitFor({ state: 'visible', timeout: waitMs });
      await locator.pressSequentially(action.text, { delay: pace.typing_delay_ms });
      await pause(pace.action_delay_ms);
      return { type: action.type, selector: action.selector };
    }
    case 'press': {
      await page.keyboard.press(action.key);
      return { type: action.type, key: action.key };
    }
    case 'wait_for': {
      const locator = page.locator(action.selector).first();
      await locator.waitFor({ state: 'visible', timeout: waitMs });
      return { type: action.type, selector: action.selector };
    }
    case 'extract_text': {
      const value = await page.locator(action.selector).first().textContent();
      return { type: action.type, selector: action.selector, value };
    }
    case 'scroll': {
      await page.mouse.wheel(0, action.pixels);
      await pause(pace.action_delay_ms);
      return { type: action.type, pixels: action.pixels };
    }
    case 'screenshot': {
      const target = path.join(run.artifactsDir, action.file_name);
      await page.screenshot({ path: target, fullPage: false });
      return { type: action.type, value: target };
    }
    case 'evaluate': {
      const value = await page.evaluate(action.expression);
      return { type: action.type, value };
    }
    case 'pause': {
      await pause([action.min_ms, action.max_ms]);
      return { type: action.type };
    }
    default:
      throw new Error(`Unsupported action type: ${action.type}`);
  }
}

const outputs = [];
try {
  for (const action of plan.actions) {
    outputs.push(await step(action));
  }
  await context.storageState({ path: stateFile });
  emit(true, outputs, null);
} catch (error) {
  emit(false, outputs, String((error && error.stack) || error));
  process.exitCode = 1;
} finally {
  await context.close().catch(() => {});
  await browser.close().catch(() => {});
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::PageAction;
    use tempfile::tempdir;

    fn driver() -> (PlaywrightDriver, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let driver = PlaywrightDriver::new(DriverSettings {
            headless: true,
            root_dir: dir.path().join("browser"),
        })
        .unwrap();
        (driver, dir)
    }

    #[test]
    fn runner_script_covers_every_action_type() {
        let (driver, _dir) = driver();
        let plan = ActionPlan::new("smoke")
            .push(PageAction::Navigate {
                url: "https://store.example.com".to_string(),
            })
            .push(PageAction::Pause {
                min_ms: 100,
                max_ms: 200,
            });
        let script = driver.build_runner(&plan, &Pacing::relaxed()).unwrap();

        for case in [
            "case 'navigate'",
            "case 'click'",
            "case 'type_text'",
            "case 'extract_text'",
            "case 'screenshot'",
            "case 'pause'",
        ] {
            assert!(script.contains(case), "missing {case}");
        }
        assert!(script.contains("\"label\":\"smoke\""));
        assert!(script.contains("storage-state.json"));
    }

    #[test]
    fn runner_script_embeds_active_pacing() {
        let (driver, _dir) = driver();
        let mut pacing = Pacing::relaxed();
        pacing.typing_delay_ms = 123;
        let plan = ActionPlan::new("paced");
        let script = driver.build_runner(&plan, &pacing).unwrap();
        assert!(script.contains("\"typing_delay_ms\":123"));
    }

    #[test]
    fn split_marker_extracts_payload_and_logs() {
        let stdout = format!(
            "warming up\n{RESULT_MARKER}{}\ntrailing",
            r#"{"success":true,"outputs":[{"type":"navigate"}],"error":null}"#
        );
        let (logs, payload) = split_marker(&stdout);
        assert_eq!(logs, vec!["warming up".to_string(), "trailing".to_string()]);
        let payload = payload.unwrap();
        assert_eq!(payload["success"], true);
        assert_eq!(payload["outputs"][0]["type"], "navigate");
    }

    #[tokio::test]
    async fn apply_profile_swaps_the_session_pacing() {
        let (driver, _dir) = driver();
        assert_eq!(driver.pacing().profile_name, "default");

        let profile = crate::pace::slow_profile();
        driver.apply_profile(&profile).await.unwrap();
        assert_eq!(driver.pacing().profile_name, "Conservative");
        assert_eq!(driver.pacing().page_load_wait_ms, (10_000, 20_000));
    }
}
