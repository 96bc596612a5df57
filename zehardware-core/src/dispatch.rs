//! Command dispatch
//!
//! Turns a received line into exactly one handler call. Every failure is
//! caught here, logged with shortened copies of the offending text, and
//! ends the handling of that command only.

use alloc::string::String;

use zehardware_display::Bitmap;
use zehardware_protocol::{decode, preview, Command, RawCommand, Slot};

use crate::codec;
use crate::error::Error;
use crate::scheduler::{Agent, Board, Flow};
use crate::storage::SlotFile;

impl<B: Board> Agent<B> {
    /// Decode a line and run the command it carries
    pub async fn dispatch_line(&mut self, line: &str) -> Flow {
        match decode(line) {
            Ok(raw) => self.dispatch(raw).await,
            Err(e) => {
                log_warn!(
                    self.console,
                    "Failed to decode '{}'. Reason: {}",
                    preview(line, self.config.preview_len),
                    Error::from(e)
                );
                Flow::Continue
            }
        }
    }

    /// Validate a decoded triple and run its handler
    pub async fn dispatch(&mut self, raw: RawCommand) -> Flow {
        match Command::try_from(raw) {
            Ok(command) => self.execute(command).await,
            Err(unknown) => {
                log_warn!(
                    self.console,
                    "Unknown command '{}'",
                    preview(&unknown.name, self.config.preview_len)
                );
                Flow::Continue
            }
        }
    }

    /// Run the handler for `command`
    pub async fn execute(&mut self, command: Command) -> Flow {
        log_debug!(self.console, "Handling '{}'", command.name());
        match command {
            Command::Reload => {
                log_info!(self.console, "Reloading...");
                return Flow::Reload;
            }
            Command::Exit => {
                log_info!(self.console, "Exiting...");
                return Flow::Exit;
            }
            Command::Blink => {
                log_info!(self.console, "Changing blink status...");
                self.blink_enabled = !self.blink_enabled;
            }
            Command::Terminal => {
                log_info!(self.console, "Showing terminal...");
                self.display.show_terminal();
            }
            Command::Refresh => {
                log_info!(self.console, "Scheduling screen refresh...");
                self.display.mark_due();
            }
            Command::Preview { payload } => self.preview_image(&payload),
            Command::Store {
                slot,
                metadata,
                payload,
            } => self.store_image(slot, &metadata, &payload).await,
            Command::Show { slot } => self.show_image(slot).await,
        }
        Flow::Continue
    }

    fn preview_image(&mut self, payload: &str) {
        log_info!(self.console, "Previewing image...");
        match codec::decode(payload, self.config.resolution) {
            Ok(bitmap) => self.display.show(bitmap),
            Err(e) => log_error!(
                self.console,
                "Preview failed for: '{}'. Reason: {}",
                preview(payload, self.config.preview_len),
                Error::from(e)
            ),
        }
    }

    async fn store_image(&mut self, slot: Slot, metadata: &str, payload: &str) {
        log_info!(self.console, "Storing image...");
        if let Err(e) = self.storage.store(slot, metadata, payload).await {
            log_error!(
                self.console,
                "Storing failed for: '{}':'{}'. Reason: {}",
                preview(metadata, self.config.preview_len),
                preview(payload, self.config.preview_len),
                Error::from(e)
            );
        }
    }

    async fn show_image(&mut self, slot: Slot) {
        log_info!(self.console, "Showing image...");
        let mut metadata = String::new();
        let mut payload = String::new();
        match self.load_image(slot, &mut metadata, &mut payload).await {
            Ok(bitmap) => self.display.show(bitmap),
            Err(e) => log_error!(
                self.console,
                "Showing failed for: '{}':'{}'. Reason: {}",
                preview(&metadata, self.config.preview_len),
                preview(&payload, self.config.preview_len),
                e
            ),
        }
    }

    /// Read both slot files and decode the payload
    ///
    /// Whatever was read before a failure is left in `metadata` and
    /// `payload` for the log line.
    async fn load_image(
        &mut self,
        slot: Slot,
        metadata: &mut String,
        payload: &mut String,
    ) -> Result<Bitmap, Error> {
        *metadata = self.storage.load(slot, SlotFile::Metadata).await?;
        *payload = self.storage.load(slot, SlotFile::Payload).await?;
        Ok(codec::decode(payload.as_str(), self.config.resolution)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::codec;
    use crate::config::AgentConfig;
    use crate::display::RootContent;
    use crate::mock::{peripherals, MockBoard, Shown};
    use crate::scheduler::{Agent, Flow};
    use crate::storage::SlotFile;
    use embassy_futures::block_on;
    use zehardware_display::{Bitmap, Palette, Resolution};
    use zehardware_protocol::{RawCommand, Slot};

    const METADATA: &str = "eyJuYW1lIjoiY2F0In0=";

    fn agent() -> Agent<MockBoard> {
        let mut agent =
            Agent::new(AgentConfig::DEFAULT, peripherals(Resolution::new(128, 64))).unwrap();
        // Consume the boot refresh
        block_on(agent.tick());
        agent
    }

    fn checkerboard() -> Bitmap {
        let mut bitmap = Bitmap::new(Resolution::new(128, 64), Palette::TWO_TONE);
        for y in 0..64 {
            for x in 0..128 {
                bitmap.set(x, y, ((x / 4 + y / 4) % 2) as u8);
            }
        }
        bitmap
    }

    fn send(agent: &mut Agent<MockBoard>, name: &str, metadata: &str, payload: &str) -> Flow {
        let line = RawCommand::new(name, metadata, payload).encode();
        agent.serial_mut().push(std::format!("{}\r\n", line).as_bytes());
        block_on(agent.tick())
    }

    fn transcript(agent: &Agent<MockBoard>) -> std::string::String {
        agent.console().terminal().lines().collect()
    }

    #[test]
    fn test_preview_shows_image() {
        let mut agent = agent();
        let image = checkerboard();
        send(&mut agent, "preview", "", &codec::encode(&image));

        assert_eq!(agent.display().root(), &RootContent::Image(image.clone()));
        assert!(agent.state().refresh_due);
        assert!(transcript(&agent).contains("Previewing image..."));

        while agent.state().tick <= 10 {
            block_on(agent.tick());
        }
        assert_eq!(
            agent.display().panel().shown.last(),
            Some(&Shown::Image(image))
        );
    }

    #[test]
    fn test_preview_split_across_ticks() {
        let mut agent = agent();
        let before = agent.display().root().clone();
        let image = checkerboard();
        let line = RawCommand::new("preview", "", &codec::encode(&image)).encode();
        let line = std::format!("{}\r\n", line);
        let (head, tail) = line.as_bytes().split_at(line.len() / 2);

        agent.serial_mut().push(head);
        block_on(agent.tick());
        assert_eq!(agent.display().root(), &before);
        assert!(!transcript(&agent).contains("Failed to decode"));

        agent.serial_mut().push(tail);
        block_on(agent.tick());
        assert_eq!(agent.display().root(), &RootContent::Image(image));
        assert_eq!(transcript(&agent).matches("Previewing image...").count(), 1);
    }

    #[test]
    fn test_preview_failure_keeps_display() {
        let mut agent = agent();
        let before = agent.display().root().clone();
        let payload = "eJy12F9MG3UcAPDvtef16q5wdTquKbPXQpgPaFq6MCbRnWwhI2Ga+GCM";
        send(&mut agent, "preview", "", payload);

        assert_eq!(agent.display().root(), &before);
        assert!(!agent.state().refresh_due);
        assert!(transcript(&agent).contains("Preview failed for: 'eJy1...GCM'"));
    }

    #[test]
    fn test_store_then_show_matches_preview() {
        let image = checkerboard();
        let payload = codec::encode(&image);

        let mut previewed = agent();
        send(&mut previewed, "preview", "", &payload);

        let mut stored = agent();
        send(&mut stored, "store-up", METADATA, &payload);
        assert!(transcript(&stored).contains("Storing image..."));
        assert!(stored.storage().files().get("up.bin.gz.base64").is_some());
        assert_eq!(
            stored.storage().files().get("up.metadata.base64"),
            Some(&br#"{"name":"cat"}"#[..])
        );

        send(&mut stored, "show-up", "", "");
        assert_eq!(stored.display().root(), previewed.display().root());
    }

    #[test]
    fn test_store_does_not_touch_display() {
        let mut agent = agent();
        let before = agent.display().root().clone();
        send(&mut agent, "store-a", METADATA, &codec::encode(&checkerboard()));
        assert_eq!(agent.display().root(), &before);
        assert!(!agent.state().refresh_due);
    }

    #[test]
    fn test_store_rejects_invalid_base64() {
        let mut agent = agent();
        send(&mut agent, "store-b", "not base64!", "AAAA");
        assert!(agent.storage().files().is_empty());
        assert!(transcript(&agent).contains("Storing failed for: 'not ...64!':'AAAA'"));
    }

    #[test]
    fn test_show_empty_slot_fails() {
        let mut agent = agent();
        let before = agent.display().root().clone();
        send(&mut agent, "show-c", "", "");
        assert_eq!(agent.display().root(), &before);
        assert!(transcript(&agent).contains("Showing failed for: '':''"));
    }

    #[test]
    fn test_show_logs_partial_data() {
        let mut agent = agent();
        let key = SlotFile::Metadata.key(Slot::Down).unwrap();
        block_on(agent.storage.write(&key, METADATA)).unwrap();
        send(&mut agent, "show-down", "", "");
        assert!(transcript(&agent).contains("Showing failed for: 'eyJu...n0=':''"));

        let mut agent = self::agent();
        send(&mut agent, "store-down", METADATA, "AAAA");
        send(&mut agent, "show-down", "", "");
        // Payload decodes to three zero bytes, not a zlib stream
        assert!(transcript(&agent).contains("Showing failed for: 'eyJu...n0=':'AAAA'"));
        assert!(transcript(&agent).contains("invalid zlib data"));
    }

    #[test]
    fn test_store_write_failure_is_logged() {
        let mut board = peripherals(Resolution::new(128, 64));
        board.files.fail_writes = true;
        let mut agent = Agent::new(AgentConfig::DEFAULT, board).unwrap();
        block_on(agent.tick());

        send(&mut agent, "store-a", METADATA, "AAAA");
        assert!(transcript(&agent).contains("flash operation failed"));
    }

    #[test]
    fn test_reload_and_exit_flows() {
        let mut agent = agent();
        assert_eq!(send(&mut agent, "reload", "", ""), Flow::Reload);
        let mut agent = self::agent();
        assert_eq!(send(&mut agent, "exit", "", ""), Flow::Exit);
    }

    #[test]
    fn test_decode_failure_is_logged() {
        let mut agent = agent();
        // Valid base64 of "blink" without delimiters
        agent.serial_mut().push(b"Ymxpbms=\r\n");
        block_on(agent.tick());
        assert!(!agent.state().blink_enabled);
        assert!(transcript(&agent).contains("Failed to decode 'Ymxpbms='"));
    }
}
