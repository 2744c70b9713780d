/// Connection status event emitted by the acquisition worker.
#[derive(Debug, Clone)]
pub struct LinkEvent {
    pub connected: bool,
    pub message: String,
}

impl LinkEvent {
    pub fn up(message: impl Into<String>) -> Self {
        Self {
            connected: true,
            message: message.into(),
        }
    }

    pub fn down(message: impl Into<String>) -> Self {
        Self {
            connected: false,
            message: message.into(),
        }
    }
}
