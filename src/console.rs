
/***
 * Console
 *
 *  The interactive menu. Every option maps onto the registry:
 *      1 add instrument        -> SensorRegistry::create
 *      2 record reading        -> SensorRegistry::record
 *      3 run processing pass   -> SensorRegistry::process_all
 *      4 list instruments      -> SensorRegistry::describe_all
 *      5 read one frame        -> decode_frame + SensorRegistry::ingest_frame
 *      6 continuous monitor    -> as 5, in a loop, processing every N frames
 *      7 exit
 *
 *  Registry errors are reported and the menu carries on. Serial reads block,
 *  so they run on tokio's blocking pool; the registry itself is only ever
 *  touched from the console task.
 */
use std::future::Future;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::frame::decode_frame;
use crate::registry::{RegistryError, SensorRegistry};
use crate::serial::{FrameSource, SerialError};

pub type BoxedSource = Box<dyn FrameSource + Send>;

const MENU: &str = "
===== Sensor Hub =====
1. Add instrument
2. Record reading
3. Run processing pass
4. List instruments
5. Read one frame from the serial port
6. Monitor the serial port continuously
7. Exit
Choose an option: ";

const NO_PORT: &str = "[Error] Serial port is not open. Check the connection.";
const KIND_PROMPT: &str = "Instrument kind (T=temperature, P=pressure): ";
const ID_PROMPT: &str = "Instrument ID (e.g. T-001): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Add,
    Record,
    Process,
    List,
    ReadFrame,
    Monitor,
    Exit,
}

impl Choice {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().parse::<u8>().ok()? {
            1 => Some(Choice::Add),
            2 => Some(Choice::Record),
            3 => Some(Choice::Process),
            4 => Some(Choice::List),
            5 => Some(Choice::ReadFrame),
            6 => Some(Choice::Monitor),
            7 => Some(Choice::Exit),
            _ => None,
        }
    }
}

pub struct Console {
    registry: SensorRegistry,
    source: Option<BoxedSource>,
    settle_delay: Duration,
    process_every: usize,
}

impl Console {
    pub fn new(config: &Config, source: Option<BoxedSource>) -> Self {
        Self {
            registry: SensorRegistry::new(),
            source,
            settle_delay: config.settle_delay,
            process_every: config.process_every.max(1),
        }
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Runs the menu until the exit option or end of input.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        loop {
            write!(out, "{MENU}")?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            match Choice::parse(&line) {
                Some(Choice::Add) => {
                    let Some(tag) = prompt(&mut lines, out, KIND_PROMPT).await? else {
                        break;
                    };
                    let Some(id) = prompt(&mut lines, out, ID_PROMPT).await? else {
                        break;
                    };
                    self.add(&tag, &id, out)?;
                }
                Some(Choice::Record) => {
                    let Some(id) = prompt(&mut lines, out, "Instrument ID: ").await? else {
                        break;
                    };
                    let Some(value) = prompt(&mut lines, out, "Reading value: ").await? else {
                        break;
                    };
                    match self.registry.record(&id, &value) {
                        Ok(v) => writeln!(out, "Recorded {v} for {id}.")?,
                        Err(err) => writeln!(out, "[Error] {err}")?,
                    }
                }
                Some(Choice::Process) => self.process_pass(out)?,
                Some(Choice::List) => {
                    writeln!(out, "[Sensor registry]")?;
                    writeln!(out, "{}", self.registry.describe_all())?;
                }
                Some(Choice::ReadFrame) => self.read_one(out).await?,
                Some(Choice::Monitor) => self.monitor(out, interrupted()).await?,
                Some(Choice::Exit) => break,
                None => writeln!(out, "Invalid option.")?,
            }
        }

        writeln!(out, "Exiting.")?;
        Ok(())
    }

    fn add<W: Write>(&mut self, tag: &str, id: &str, out: &mut W) -> anyhow::Result<()> {
        let created = match tag.chars().next() {
            Some(tag) => self.registry.create(tag, id).map(|_| ()),
            None => Err(RegistryError::UnknownKind(String::new())),
        };
        match created {
            Ok(()) => writeln!(out, "Sensor '{id}' created.")?,
            Err(err) => writeln!(out, "[Error] {err}")?,
        }
        Ok(())
    }

    fn process_pass<W: Write>(&mut self, out: &mut W) -> anyhow::Result<()> {
        writeln!(out, "--- Processing pass ---")?;
        for analysis in self.registry.process_all() {
            writeln!(out, "{analysis}")?;
        }
        Ok(())
    }

    fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> anyhow::Result<()> {
        let at = Local::now().format("%H:%M:%S");
        writeln!(out, "[RX {at}] Frame received: {line}")?;

        let frame = decode_frame(line);
        match self.registry.ingest_frame(&frame) {
            Ok(got) if got.created => {
                writeln!(out, "Sensor {} did not exist, created it.", got.sensor)?;
                writeln!(out, "Recorded {} for {}.", got.value, got.sensor)?;
            }
            Ok(got) => writeln!(out, "Recorded {} for {}.", got.value, got.sensor)?,
            Err(err) => writeln!(out, "[Error] {err}")?,
        }
        Ok(())
    }

    async fn settle<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        if !self.settle_delay.is_zero() {
            writeln!(out, "Waiting for the device to settle...")?;
            out.flush()?;
            tokio::time::sleep(self.settle_delay).await;
        }
        Ok(())
    }

    // a disconnected port is dropped; later serial options report it missing
    fn reclaim<W: Write>(
        &mut self,
        source: BoxedSource,
        outcome: Result<(), SerialError>,
        out: &mut W,
    ) -> anyhow::Result<()> {
        match outcome {
            Ok(()) => self.source = Some(source),
            Err(SerialError::Disconnected) => {
                warn!("serial source disconnected");
                writeln!(out, "[Error] {}", SerialError::Disconnected)?;
            }
            Err(err) => {
                warn!(%err, "serial read failed");
                writeln!(out, "[Error] {err}")?;
                self.source = Some(source);
            }
        }
        Ok(())
    }

    async fn read_one<W: Write>(&mut self, out: &mut W) -> anyhow::Result<()> {
        let Some(mut source) = self.source.take() else {
            writeln!(out, "{NO_PORT}")?;
            return Ok(());
        };
        self.settle(out).await?;
        writeln!(out, "Waiting for one frame...")?;
        out.flush()?;

        let (source, read) = tokio::task::spawn_blocking(move || {
            let read = source.read_line();
            (source, read)
        })
        .await?;

        match read {
            Ok(Some(line)) => {
                self.source = Some(source);
                self.handle_line(&line, out)?;
            }
            Ok(None) => {
                self.source = Some(source);
                writeln!(out, "[Error] Read timed out or the frame was empty.")?;
            }
            Err(err) => self.reclaim(source, Err(err), out)?,
        }
        Ok(())
    }

    /// Ingests frames until `shutdown` resolves or the source disconnects,
    /// running a processing pass every `process_every` frames.
    pub async fn monitor<W, F>(&mut self, out: &mut W, shutdown: F) -> anyhow::Result<()>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        let Some(source) = self.source.take() else {
            writeln!(out, "{NO_PORT}")?;
            return Ok(());
        };
        self.settle(out).await?;
        writeln!(out, "Monitoring continuously (Ctrl+C to stop)...")?;
        out.flush()?;

        let (tx, mut rx) = mpsc::channel(32);
        let stop = Arc::new(AtomicBool::new(false));
        let pump = tokio::task::spawn_blocking({
            let stop = Arc::clone(&stop);
            move || pump_lines(source, tx, stop)
        });

        tokio::pin!(shutdown);
        let mut received = 0usize;
        loop {
            tokio::select! {
                line = rx.recv() => match line {
                    Some(line) => {
                        self.handle_line(&line, out)?;
                        received += 1;
                        if received % self.process_every == 0 {
                            self.process_pass(out)?;
                        }
                    }
                    None => break,
                },
                _ = &mut shutdown => {
                    info!(received, "monitoring interrupted");
                    writeln!(out, "Monitoring stopped.")?;
                    break;
                }
            }
        }

        stop.store(true, Ordering::Relaxed);
        drop(rx);
        let (source, outcome) = pump.await?;
        self.reclaim(source, outcome, out)
    }
}

async fn prompt<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    text: &str,
) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{text}")?;
    out.flush()?;
    Ok(lines.next_line().await?.map(|l| l.trim().to_owned()))
}

// resolves on Ctrl+C; never resolves if the handler can't be installed
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "can't listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

fn pump_lines(
    mut source: BoxedSource,
    tx: mpsc::Sender<String>,
    stop: Arc<AtomicBool>,
) -> (BoxedSource, Result<(), SerialError>) {
    while !stop.load(Ordering::Relaxed) {
        match source.read_line() {
            Ok(Some(line)) => {
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
            Ok(None) => continue,
            Err(err) => return (source, Err(err)),
        }
    }
    (source, Ok(()))
}
