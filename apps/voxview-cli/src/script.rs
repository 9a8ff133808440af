//! Scripted input for headless runs.
//!
//! One event per argument, `FRAME:WHAT[:ARG]`:
//! - `12:z:tap` presses and releases `z` during frame 12
//! - `0:up:press`, `30:up:release`
//! - `40:resize:1024x768`
//! - `90:close`

use anyhow::{Context, Result, bail};
use voxview_input::Key;
use voxview_viewer::{HeadlessWindow, HostEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptEvent {
    pub frame: u64,
    pub events: Vec<HostEvent>,
}

pub fn parse_event(text: &str) -> Result<ScriptEvent> {
    let mut parts = text.split(':');
    let frame = parts
        .next()
        .unwrap_or_default()
        .trim()
        .parse::<u64>()
        .with_context(|| format!("bad frame number in {text:?}"))?;
    let what = parts
        .next()
        .with_context(|| format!("missing key or command in {text:?}"))?;
    let arg = parts.next();
    if parts.next().is_some() {
        bail!("too many fields in {text:?}");
    }

    let events = match (what.trim().to_ascii_lowercase().as_str(), arg) {
        ("close", None) => vec![HostEvent::CloseRequested],
        ("resize", Some(size)) => {
            let (w, h) = size
                .split_once('x')
                .with_context(|| format!("resize expects WIDTHxHEIGHT, got {size:?}"))?;
            vec![HostEvent::Resized {
                width: w.trim().parse().context("bad resize width")?,
                height: h.trim().parse().context("bad resize height")?,
            }]
        }
        (name, Some(kind)) => {
            let key = Key::parse(name).with_context(|| format!("unknown key {name:?}"))?;
            match kind.trim() {
                "press" => vec![HostEvent::KeyPressed(key.into())],
                "release" => vec![HostEvent::KeyReleased(key.into())],
                "tap" => vec![
                    HostEvent::KeyPressed(key.into()),
                    HostEvent::KeyReleased(key.into()),
                ],
                other => bail!("unknown key action {other:?}, expected press, release or tap"),
            }
        }
        (name, None) => bail!("{name:?} needs an argument in {text:?}"),
    };
    Ok(ScriptEvent { frame, events })
}

/// Schedule every event on the frame's poll.
pub fn schedule(window: &mut HeadlessWindow, script: &[ScriptEvent]) {
    for item in script {
        for event in &item.events {
            window.schedule(item.frame, *event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxview_viewer::WindowHost;

    #[test]
    fn tap_is_press_then_release() {
        let e = parse_event("12:z:tap").unwrap();
        assert_eq!(e.frame, 12);
        assert_eq!(
            e.events,
            vec![
                HostEvent::KeyPressed(Key::Char('Z').into()),
                HostEvent::KeyReleased(Key::Char('Z').into()),
            ]
        );
    }

    #[test]
    fn named_keys_and_commands() {
        assert_eq!(
            parse_event("0:Up:press").unwrap().events,
            vec![HostEvent::KeyPressed(Key::Up.into())]
        );
        assert_eq!(
            parse_event("40:resize:1024x768").unwrap().events,
            vec![HostEvent::Resized {
                width: 1024,
                height: 768
            }]
        );
        assert_eq!(
            parse_event("90:close").unwrap().events,
            vec![HostEvent::CloseRequested]
        );
    }

    #[test]
    fn malformed_events_are_rejected() {
        for bad in ["", "x:z:tap", "1:z", "1:z:hold", "1:resize:big", "1:nosuchkey:tap", "1:z:tap:extra"] {
            assert!(parse_event(bad).is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn schedule_targets_polls() {
        let mut window = HeadlessWindow::new(100, 100);
        schedule(&mut window, &[parse_event("1:h:tap").unwrap()]);
        window.poll_events();
        assert!(window.drain_events().is_empty());
        window.poll_events();
        assert_eq!(window.drain_events().len(), 2);
    }
}
