//! Hardware registers exposed as text attributes (Linux IIO sysfs).
//!
//! An IIO converter shows up as a directory such as
//! `/sys/bus/iio/devices/iio:device0` holding a `name` attribute and one
//! `*_raw` file per channel. Reading a raw file yields the current conversion
//! as decimal text; writing one sets a DAC output.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{RegisterError, SetupError};

/// Longest register content we bother reading.
const READ_LIMIT: usize = 64;

/// A scalar hardware register.
pub trait Register: Send + 'static {
    /// Read the current raw value. Out-of-range values are returned as-is;
    /// clamping is the caller's business.
    fn read_raw(&mut self) -> Result<i64, RegisterError>;

    /// Replace the register content with `raw`.
    fn write_raw(&mut self, raw: u32) -> Result<(), RegisterError>;
}

impl<R: Register + ?Sized> Register for Box<R> {
    fn read_raw(&mut self) -> Result<i64, RegisterError> {
        (**self).read_raw()
    }

    fn write_raw(&mut self, raw: u32) -> Result<(), RegisterError> {
        (**self).write_raw(raw)
    }
}

/// Parse register text: optional whitespace, optional sign, decimal digits.
pub fn parse_raw(text: &str) -> Result<i64, RegisterError> {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    trimmed
        .parse::<i64>()
        .map_err(|_| RegisterError::Parse(trimmed.to_owned()))
}

/// A register backed by a file that is rewound before every access.
#[derive(Debug)]
pub struct SysfsRegister {
    path: PathBuf,
    file: File,
    buf: [u8; READ_LIMIT],
}

impl SysfsRegister {
    /// Open a register for reading.
    pub fn open_read(path: impl Into<PathBuf>) -> Result<Self, SetupError> {
        let path = path.into();
        let file = File::open(&path).map_err(|source| SetupError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self::from_file(path, file))
    }

    /// Open a register for writing. The file must already exist.
    pub fn open_write(path: impl Into<PathBuf>) -> Result<Self, SetupError> {
        let path = path.into();
        let file = OpenOptions::new()
            .write(true)
            .open(&path)
            .map_err(|source| SetupError::Open {
                path: path.clone(),
                source,
            })?;
        Ok(Self::from_file(path, file))
    }

    fn from_file(path: PathBuf, file: File) -> Self {
        Self {
            path,
            file,
            buf: [0; READ_LIMIT],
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Register for SysfsRegister {
    fn read_raw(&mut self) -> Result<i64, RegisterError> {
        self.file.seek(SeekFrom::Start(0))?;

        let mut len = 0;
        while len < READ_LIMIT {
            match self.file.read(&mut self.buf[len..])? {
                0 => break,
                n => len += n,
            }
        }

        let text = String::from_utf8_lossy(&self.buf[..len]);
        parse_raw(&text)
    }

    fn write_raw(&mut self, raw: u32) -> Result<(), RegisterError> {
        // sysfs attributes want the whole value in a single write
        let text = format!("{}\n", raw);
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(text.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}

/// An IIO converter directory.
#[derive(Clone, Debug)]
pub struct IioDevice {
    dir: PathBuf,
    name: String,
}

impl IioDevice {
    /// Open the device directory and read its `name` attribute.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SetupError> {
        let dir = dir.into();
        let name_path = dir.join("name");

        let mut file = File::open(&name_path).map_err(|source| SetupError::Open {
            path: name_path.clone(),
            source,
        })?;
        let mut name = String::new();
        file.read_to_string(&mut name)
            .map_err(|source| SetupError::DeviceName {
                path: name_path,
                source,
            })?;
        let name = name.trim_end().to_owned();

        info!(device = %name, dir = %dir.display(), "opening iio device");

        Ok(Self { dir, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The two ADC inputs, `in_voltage0_raw` and `in_voltage1_raw`.
    pub fn capture_registers(&self) -> Result<[SysfsRegister; 2], SetupError> {
        Ok([
            SysfsRegister::open_read(self.dir.join("in_voltage0_raw"))?,
            SysfsRegister::open_read(self.dir.join("in_voltage1_raw"))?,
        ])
    }

    /// The two DAC outputs, `out_voltage0_raw` and `out_voltage1_raw`.
    pub fn playback_registers(&self) -> Result<[SysfsRegister; 2], SetupError> {
        Ok([
            SysfsRegister::open_write(self.dir.join("out_voltage0_raw"))?,
            SysfsRegister::open_write(self.dir.join("out_voltage1_raw"))?,
        ])
    }
}
