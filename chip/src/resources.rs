//! Program images, loaded from memory or from a file.
use std::{fs, path::Path};

use crate::{definitions::rom, LoadError};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The program image stored as a u8 slice on the heap
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data, the data has to
    /// fit into the program area of the memory.
    ///
    /// # Example
    /// ```rust
    /// # use chip::resources::Rom;
    /// let rom = Rom::new("demo", vec![0x60, 0x05]).unwrap();
    /// assert_eq!(rom.get_data(), &[0x60, 0x05]);
    /// assert!(Rom::new("empty", Vec::<u8>::new()).is_err());
    /// ```
    pub fn new<D: Into<Box<[u8]>>>(name: &str, data: D) -> Result<Self, LoadError> {
        let data = data.into();
        if data.is_empty() {
            return Err(LoadError::Empty);
        }
        if data.len() > rom::MAX_SIZE {
            return Err(LoadError::TooLarge {
                len: data.len(),
                max: rom::MAX_SIZE,
            });
        }

        Ok(Rom {
            name: name.to_string(),
            data,
        })
    }

    /// Will read the rom from the given file, the file name is used as the rom name.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let name = path
            .file_stem()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        log::info!("Read {} bytes from {}", data.len(), path.display());
        Self::new(&name, data)
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::definitions::rom::MAX_SIZE;

    #[test]
    fn test_rom_sizes() {
        assert!(matches!(Rom::new("empty", Vec::<u8>::new()), Err(LoadError::Empty)));
        assert!(Rom::new("full", vec![0xFF; MAX_SIZE]).is_ok());
        assert!(matches!(
            Rom::new("large", vec![0xFF; MAX_SIZE + 1]),
            Err(LoadError::TooLarge { len, max }) if len == MAX_SIZE + 1 && max == MAX_SIZE
        ));
    }

    #[test]
    fn test_rom_from_path() {
        let path = std::env::temp_dir().join(format!("chip8-vm-{}.ch8", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            file.write_all(&[0x00, 0xE0, 0x12, 0x00]).unwrap();
        }

        let rom = Rom::from_path(&path).unwrap();
        assert_eq!(rom.get_data(), &[0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(rom.get_name(), format!("chip8-vm-{}", std::process::id()));

        fs::remove_file(&path).unwrap();
        assert!(matches!(Rom::from_path(&path), Err(LoadError::Io(_))));
    }
}
