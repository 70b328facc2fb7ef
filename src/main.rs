use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use video_controls::platform::{MediaEvent, SimulatedDocument, SimulatedVideoElement};
use video_controls::{ControlsScope, PlayStatus, UseVideoControlsParams, VideoControls, VideoStatus};

/// Replay a script of media events against a simulated video element and
/// print what the controls report after every step.
#[derive(Parser, Debug)]
#[command(name = "video-controls", version)]
struct Cli {
    /// Comma separated steps: native event names (canplay, play, playing,
    /// waiting, ...), or sleep:<ms>, advance:<secs>, seek:<secs>,
    /// volume:<0..1>, rate:<x>, mute, unmute, loop, noloop
    #[arg(long, default_value = "canplay,play,playing,waiting,sleep:600,playing")]
    script: String,

    /// Media duration in seconds
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// JSON file with {defaultMute, defaultVolume, defaultPlayRate, defaultLoop}
    #[arg(long)]
    params: Option<std::path::PathBuf>,

    #[arg(long)]
    default_mute: bool,

    #[arg(long)]
    default_volume: Option<f64>,

    #[arg(long)]
    default_play_rate: Option<f64>,

    #[arg(long)]
    default_loop: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot<'a> {
    step: &'a str,
    current_time: f64,
    duration: f64,
    status: VideoStatus,
    play_status: PlayStatus,
    paused: bool,
    muted: bool,
    volume: f64,
    playback_rate: f64,
    #[serde(rename = "loop")]
    looping: bool,
    refreshes: u64,
}

enum Step {
    Event(MediaEvent),
    Sleep(u64),
    Advance(f64),
    Seek(f64),
    Volume(f64),
    Rate(f64),
    Mute(bool),
    Loop(bool),
}

fn parse_step(raw: &str) -> anyhow::Result<Step> {
    let raw = raw.trim();
    let step = match raw.split_once(':') {
        Some(("sleep", v)) => Step::Sleep(v.parse().with_context(|| format!("bad step '{}'", raw))?),
        Some(("advance", v)) => Step::Advance(v.parse().with_context(|| format!("bad step '{}'", raw))?),
        Some(("seek", v)) => Step::Seek(v.parse().with_context(|| format!("bad step '{}'", raw))?),
        Some(("volume", v)) => Step::Volume(v.parse().with_context(|| format!("bad step '{}'", raw))?),
        Some(("rate", v)) => Step::Rate(v.parse().with_context(|| format!("bad step '{}'", raw))?),
        Some(_) => bail!("unknown step '{}'", raw),
        None => match raw {
            "mute" => Step::Mute(true),
            "unmute" => Step::Mute(false),
            "loop" => Step::Loop(true),
            "noloop" => Step::Loop(false),
            ev => Step::Event(ev.parse::<MediaEvent>().map_err(anyhow::Error::msg)?),
        },
    };
    Ok(step)
}

fn load_params(cli: &Cli) -> anyhow::Result<UseVideoControlsParams> {
    let mut params = match &cli.params {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            UseVideoControlsParams::from_json(&raw)?
        }
        None => UseVideoControlsParams::default(),
    };
    params.default_mute |= cli.default_mute;
    params.default_loop |= cli.default_loop;
    if let Some(v) = cli.default_volume {
        params.default_volume = v;
    }
    if let Some(r) = cli.default_play_rate {
        params.default_play_rate = r;
    }
    params.validate()?;
    Ok(params)
}

fn print_snapshot(step: &str, controls: &VideoControls, scope: &ControlsScope) -> anyhow::Result<()> {
    let snap = Snapshot {
        step,
        current_time: controls.current_time(),
        duration: controls.duration(),
        status: controls.status(),
        play_status: controls.play_status(),
        paused: controls.paused(),
        muted: controls.muted(),
        volume: controls.volume(),
        playback_rate: controls.playback_rate(),
        looping: controls.looping(),
        refreshes: scope.refresh_generation(),
    };
    println!("{}", serde_json::to_string(&snap)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let params = load_params(&cli)?;
    let steps = cli
        .script
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_step(s).map(|step| (s.trim().to_string(), step)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let document = Arc::new(SimulatedDocument::new());
    let scope = ControlsScope::new(document.clone());
    let (controls, element_ref) = scope.use_video_controls(params);

    let element = Arc::new(SimulatedVideoElement::attached_to(document));
    element.set_duration(cli.duration);
    element_ref.bind(element.clone());
    scope.mount();
    print_snapshot("mount", &controls, &scope)?;

    for (label, step) in steps {
        match step {
            Step::Event(ev) => element.dispatch(ev),
            Step::Sleep(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            Step::Advance(secs) => element.advance(secs),
            Step::Seek(secs) => controls.set_current_time(secs),
            Step::Volume(v) => controls.set_volume(v),
            Step::Rate(r) => controls.set_playback_rate(r),
            Step::Mute(m) => controls.set_muted(m),
            Step::Loop(l) => controls.set_looping(l),
        }
        print_snapshot(&label, &controls, &scope)?;
    }

    scope.unmount();
    Ok(())
}
