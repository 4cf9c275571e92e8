use std::{
    io::{self, Write},
    time::Duration,
};

use chip::devices::SoundCommands;

/// Rings the terminal bell, the bell has a fixed length so only the start
/// of a tone is heard.
#[derive(Debug, Default)]
pub struct Bell;

impl SoundCommands for Bell {
    fn play(&mut self, duration: Duration) {
        log::debug!("Ringing the bell for {:?}", duration);
        let mut stdout = io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            log::error!("Unable to ring the bell: {}", err);
        }
    }

    fn stop(&mut self) {}
}
