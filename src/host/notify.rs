use crate::ports::NotifierPort;

/// Prints notifications, for the command line.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl NotifierPort for ConsoleNotifier {
    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Keeps notifications so they can be handed back to the host.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Vec<String>,
}

impl RecordingNotifier {
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl NotifierPort for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        log::info!("notification: {message}");
        self.messages.push(message.to_string());
    }
}
