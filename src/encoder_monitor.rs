//! Sources of encoder readings that run in the background.
//!
//! A source owns one thread that keeps overwriting a shared slot with the
//! most recent [`EncoderReading`]. The capture loop only ever peeks at that
//! slot, so a reading may be a few milliseconds stale; that is fine for
//! stamping trace samples.

use crate::encoder_message_decoder::EncoderReading;

use log::{debug, info, warn};
use rand::prelude::*;
use serial2::SerialPort;
use std::{
    borrow::Cow,
    fmt, io,
    path::PathBuf,
    str::{self, FromStr},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc, Mutex, MutexGuard,
    },
    thread,
    time::Duration,
};

/// How long a blocking serial read may take before we check for a stop
/// signal again.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// A line this long without a newline is noise and gets thrown away.
pub const MAX_LINE_LEN: usize = 256;

/// Something that knows the latest encoder angles.
pub trait EncoderSource: Send {
    /// The most recent reading, or `None` if nothing has arrived yet.
    fn latest(&self) -> Option<EncoderReading>;

    /// Stop the background thread. Calling this more than once is harmless.
    fn stop(&mut self);
}

/// Errors from opening an encoder device.
#[derive(Debug)]
pub enum EncoderError {
    /// Returned when the serial port cannot be opened or configured.
    Serial(String, io::Error),
}

impl fmt::Display for EncoderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            EncoderError::Serial(device, error) => {
                Cow::from(format!("serial device {}: {}", device, error))
            }
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for EncoderError {}

enum Signal {
    Stop,
}

/// The latest reading, shared between a source and its thread.
#[derive(Debug)]
struct Slot {
    reading: Mutex<Option<EncoderReading>>,
    poison_reported: AtomicBool,
}

impl Slot {
    fn new(reading: Option<EncoderReading>) -> Arc<Self> {
        Arc::new(Slot {
            reading: Mutex::new(reading),
            poison_reported: AtomicBool::new(false),
        })
    }

    // A reading is plain data, so a poisoned lock still holds a usable value.
    fn lock(&self) -> MutexGuard<'_, Option<EncoderReading>> {
        self.reading.lock().unwrap_or_else(|poisoned| {
            if !self.poison_reported.swap(true, Ordering::Relaxed) {
                warn!("Encoder reader panicked while holding the latest reading");
            }
            poisoned.into_inner()
        })
    }

    fn peek(&self) -> Option<EncoderReading> {
        *self.lock()
    }

    fn store(&self, reading: EncoderReading) {
        *self.lock() = Some(reading);
    }
}

/// Collects raw serial bytes and hands back complete lines.
#[derive(Debug, Default)]
pub struct LineAssembler {
    read_buf: Vec<u8>,
}

impl LineAssembler {
    /// Feed freshly read bytes, calling `on_line` with every line they
    /// complete (newline included). Lines longer than [MAX_LINE_LEN] are
    /// dropped.
    pub fn push(&mut self, bytes: &[u8], mut on_line: impl FnMut(&[u8])) {
        for &c in bytes {
            if self.read_buf.len() >= MAX_LINE_LEN {
                warn!(
                    "Dropping {} bytes of encoder input without a newline",
                    self.read_buf.len()
                );
                self.read_buf.clear();
            }
            self.read_buf.push(c);
            if c == b'\n' {
                on_line(&self.read_buf);
                self.read_buf.clear();
            }
        }
    }
}

/// Decode one raw line from the device, logging anything unexpected.
pub fn decode_line(line: &[u8]) -> Option<EncoderReading> {
    match str::from_utf8(line) {
        Ok(s) => match EncoderReading::from_str(s) {
            Ok(reading) => Some(reading),
            Err(e) => {
                warn!("Was unable to parse encoder message: {}", e);
                None
            }
        },
        // Often happens at the beginning of transmission when
        // there is still garbage in the hardware buffer
        Err(e) => {
            warn!("Failed to decode utf-8: {:?}", e);
            None
        }
    }
}

/// Reads encoder lines from a serial device on a background thread.
pub struct SerialEncoder {
    handle: Option<thread::JoinHandle<()>>,
    tx: mpsc::Sender<Signal>,
    latest: Arc<Slot>,
}

impl SerialEncoder {
    /// Serial devices present on this machine.
    pub fn available_ports() -> io::Result<Vec<PathBuf>> {
        SerialPort::available_ports()
    }

    /// Open `device` at `baud` and start reading from it.
    pub fn open(device: &str, baud: u32) -> Result<Self, EncoderError> {
        let mut port = SerialPort::open(device, baud)
            .map_err(|e| EncoderError::Serial(device.to_owned(), e))?;
        port.set_read_timeout(READ_TIMEOUT)
            .map_err(|e| EncoderError::Serial(device.to_owned(), e))?;
        info!("Reading encoders from {} at {} baud", device, baud);

        let (tx, rx) = mpsc::channel::<Signal>();
        let latest = Slot::new(None);
        let th_latest = Arc::clone(&latest);

        let handle = thread::spawn(move || {
            let mut buffer = [0; 256];
            let mut lines = LineAssembler::default();

            loop {
                if let Ok(Signal::Stop) = rx.try_recv() {
                    break;
                }
                let read_len = match port.read(&mut buffer) {
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!("Encoder device disconnected: {}", e);
                        break;
                    }
                };
                lines.push(&buffer[..read_len], |line| {
                    if let Some(reading) = decode_line(line) {
                        debug!("Received {:?}", reading);
                        th_latest.store(reading);
                    }
                });
            }
            info!("Serial encoder reader stopped");
        });

        Ok(SerialEncoder {
            handle: Some(handle),
            tx,
            latest,
        })
    }
}

impl EncoderSource for SerialEncoder {
    fn latest(&self) -> Option<EncoderReading> {
        self.latest.peek()
    }

    fn stop(&mut self) {
        let _ = self.tx.send(Signal::Stop);
        if let Some(thread) = self.handle.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SerialEncoder {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A stand-in for the arm that wanders its joints around randomly, so the
/// experiment can be run without hardware attached.
pub struct DummyEncoder {
    handle: Option<thread::JoinHandle<()>>,
    tx: mpsc::Sender<Signal>,
    latest: Arc<Slot>,
}

impl DummyEncoder {
    /// Start producing readings every `period`, beginning at `start`.
    pub fn new(start: EncoderReading, period: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<Signal>();
        let latest = Slot::new(Some(start));
        let th_latest = Arc::clone(&latest);

        let handle = thread::spawn(move || {
            let mut rng = thread_rng();
            let mut reading = start;
            loop {
                if let Ok(Signal::Stop) = rx.try_recv() {
                    break;
                }
                reading = wander(&mut rng, reading);
                th_latest.store(reading);
                thread::sleep(period);
            }
        });

        DummyEncoder {
            handle: Some(handle),
            tx,
            latest,
        }
    }
}

impl Default for DummyEncoder {
    fn default() -> Self {
        Self::new(
            EncoderReading {
                encoder_1_deg: 60.0,
                encoder_2_deg: 45.0,
            },
            Duration::from_millis(20),
        )
    }
}

fn wander(rng: &mut impl Rng, reading: EncoderReading) -> EncoderReading {
    EncoderReading {
        encoder_1_deg: (reading.encoder_1_deg + rng.gen_range(-1.0..1.0)).clamp(-180.0, 180.0),
        encoder_2_deg: (reading.encoder_2_deg + rng.gen_range(-1.0..1.0)).clamp(0.0, 180.0),
    }
}

impl EncoderSource for DummyEncoder {
    fn latest(&self) -> Option<EncoderReading> {
        self.latest.peek()
    }

    fn stop(&mut self) {
        let _ = self.tx.send(Signal::Stop);
        if let Some(thread) = self.handle.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for DummyEncoder {
    fn drop(&mut self) {
        self.stop();
    }
}
