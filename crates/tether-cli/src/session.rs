//! Line-oriented bridge sessions.
//!
//! A script is one command per line. Blank lines and lines starting with
//! `#` are skipped. Every command is followed by one host tick, after which
//! finished clipboard operations are collected.
//!
//! | command              | effect                                           |
//! |----------------------|--------------------------------------------------|
//! | `save <key> <value>` | write `value` to storage                         |
//! | `load <key>`         | print the stored value                           |
//! | `copy [text]`        | copy `text`, or dequeue the first stashed string |
//! | `paste`              | push the clipboard contents onto the list        |
//! | `log <text>`         | send `text` to the guest console                 |
//! | `list`               | print the string list                            |
//! | `stash` / `restore`  | save or load the packed string list              |
//! | `tick`               | run one more host tick                           |

use anyhow::{Context, Result, anyhow, bail};
use std::io::Write;
use tether_host::{Bridge, Waiter, load_data, save_data};
use tracing::{debug, warn};

/// One parsed script line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Save { key: String, value: String },
    Load { key: String },
    Copy(Option<String>),
    Paste,
    Log(String),
    List,
    Stash,
    Restore,
    Tick,
}

impl Command {
    /// Parse one line. `Ok(None)` for blank lines and comments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "save" => {
                let (key, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("usage: save <key> <value>"))?;
                Command::Save {
                    key: key.to_string(),
                    value: value.trim_start().to_string(),
                }
            }
            "load" if !rest.is_empty() => Command::Load {
                key: rest.to_string(),
            },
            "load" => bail!("usage: load <key>"),
            "copy" if rest.is_empty() => Command::Copy(None),
            "copy" => Command::Copy(Some(rest.to_string())),
            "paste" => Command::Paste,
            "log" => Command::Log(rest.to_string()),
            "list" => Command::List,
            "stash" => Command::Stash,
            "restore" => Command::Restore,
            "tick" => Command::Tick,
            other => bail!("unknown command `{}`", other),
        };
        Ok(Some(command))
    }
}

/// Bridge plus the guest-side state a script drives.
pub struct Session<W> {
    bridge: Bridge,
    out: W,
    strings: Vec<String>,
    copies: Vec<Waiter<()>>,
    pastes: Vec<Waiter<String>>,
    max_ticks: u32,
    echo: bool,
}

impl<W: Write> Session<W> {
    pub fn new(bridge: Bridge, out: W) -> Self {
        Self {
            bridge,
            out,
            strings: Vec::new(),
            copies: Vec::new(),
            pastes: Vec::new(),
            max_ticks: 16,
            echo: false,
        }
    }

    /// Ticks [`Session::finish`] may spend on pending clipboard operations
    pub fn with_max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Run every line of `script`, then wait for pending operations.
    ///
    /// A failing line is reported with its line number and stops the run.
    pub fn run_script(&mut self, script: &str) -> Result<()> {
        for (idx, line) in script.lines().enumerate() {
            let command =
                Command::parse(line).with_context(|| format!("line {}: `{}`", idx + 1, line))?;
            if let Some(command) = command {
                if self.echo {
                    writeln!(self.out, "> {}", line.trim())?;
                }
                self.execute(command)
                    .with_context(|| format!("line {}: `{}`", idx + 1, line.trim()))?;
            }
        }
        self.finish()
    }

    pub fn execute(&mut self, command: Command) -> Result<()> {
        debug!(target: "tether::session", ?command, "execute");
        match command {
            Command::Save { key, value } => {
                let k = self.bridge.string(&key);
                let v = self.bridge.string(&value);
                let result = self.bridge.storage_save(k, v);
                self.bridge.release(k)?;
                self.bridge.release(v)?;
                match result? {
                    Ok(()) => writeln!(self.out, "saved {}", key)?,
                    Err(oh_no) => writeln!(self.out, "error: {}", oh_no)?,
                }
            }
            Command::Load { key } => {
                let k = self.bridge.string(&key);
                let result = self.bridge.storage_load(k);
                self.bridge.release(k)?;
                match result? {
                    Ok(h) => {
                        let value = self.bridge.read_string(h)?;
                        self.bridge.release(h)?;
                        writeln!(self.out, "{} = {}", key, value.unwrap_or_default())?;
                    }
                    Err(oh_no) => writeln!(self.out, "error: {}", oh_no)?,
                }
            }
            Command::Copy(text) => {
                let text = match text {
                    Some(text) => text,
                    None if self.strings.is_empty() => {
                        writeln!(self.out, "nothing to copy")?;
                        return self.step();
                    }
                    None => self.strings.remove(0),
                };
                let h = self.bridge.string(&text);
                let poll = self.bridge.clipboard_set(h);
                self.bridge.release(h)?;
                self.copies.push(Waiter::new(poll?));
            }
            Command::Paste => {
                let poll = self.bridge.clipboard_get();
                self.pastes.push(Waiter::new(poll));
            }
            Command::Log(text) => {
                let h = self.bridge.string(&text);
                let result = self.bridge.console_log(h);
                self.bridge.release(h)?;
                result?;
            }
            Command::List => {
                for (idx, string) in self.strings.iter().enumerate() {
                    writeln!(self.out, "{}. {}", idx + 1, string)?;
                }
            }
            Command::Stash => {
                let packed = serde_json::to_string(&self.strings)?;
                let location = self.bridge.location().clone();
                save_data(&mut self.bridge, &location, packed)?;
                writeln!(self.out, "stashed {} strings", self.strings.len())?;
            }
            Command::Restore => {
                let location = self.bridge.location().clone();
                let data = load_data(&mut self.bridge, &location)?;
                self.strings = serde_json::from_slice(&data)
                    .context("When decoding the stashed string list")?;
                writeln!(self.out, "restored {} strings", self.strings.len())?;
            }
            Command::Tick => {}
        }
        self.step()
    }

    /// One host tick, then collect whatever finished.
    fn step(&mut self) -> Result<()> {
        self.bridge.tick();

        let bridge = &mut self.bridge;
        self.copies.retain_mut(|waiter| {
            waiter.try_get(bridge).is_none() && !waiter.is_done()
        });

        let mut pasted = Vec::new();
        self.pastes.retain_mut(|waiter| match waiter.try_get(bridge) {
            Some(text) => {
                pasted.push(text);
                false
            }
            None => !waiter.is_done(),
        });

        for text in pasted {
            writeln!(self.out, "pasted {}", text)?;
            self.strings.push(text);
        }
        Ok(())
    }

    /// Tick until nothing is pending or the tick budget runs out.
    pub fn finish(&mut self) -> Result<()> {
        let mut ticks = 0;
        while self.pending() > 0 && ticks < self.max_ticks {
            self.step()?;
            ticks += 1;
        }
        if self.pending() > 0 {
            warn!(
                target: "tether::session",
                pending = self.pending(),
                ticks,
                "operations still waiting at end of session"
            );
            writeln!(self.out, "{} operations still waiting", self.pending())?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Clipboard operations not yet collected
    pub fn pending(&self) -> usize {
        self.copies.len() + self.pastes.len()
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
