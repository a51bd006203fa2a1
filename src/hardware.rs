use std::fs::File;
use std::io;

use paradigm_core::PortReader;

const PORT_DEVICE: &str = "/dev/port";

/// Raw port reads through `/dev/port`. Needs root or `CAP_SYS_RAWIO`.
#[derive(Debug)]
pub struct DevPort {
    file: File,
}

impl DevPort {
    #[cfg(unix)]
    pub fn open() -> io::Result<Self> {
        let file = File::open(PORT_DEVICE)?;
        Ok(Self { file })
    }

    #[cfg(not(unix))]
    pub fn open() -> io::Result<Self> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{PORT_DEVICE} is not available on this platform"),
        ))
    }
}

impl PortReader for DevPort {
    #[cfg(unix)]
    fn read_port(&mut self, address: u16) -> io::Result<u8> {
        use std::os::unix::fs::FileExt;

        let mut byte = [0u8; 1];
        self.file.read_exact_at(&mut byte, u64::from(address))?;
        Ok(byte[0])
    }

    #[cfg(not(unix))]
    fn read_port(&mut self, _address: u16) -> io::Result<u8> {
        let _ = &self.file;
        Err(io::ErrorKind::Unsupported.into())
    }
}
