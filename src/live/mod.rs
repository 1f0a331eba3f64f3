//! Real-time voice calls: microphone in, model speech out.

pub mod devices;
pub mod events;
pub mod pcm;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod transport;
pub mod volume;

pub use devices::{AudioCapture, AudioDevices, AudioSink};
pub use events::{LiveEvent, LiveEventStream};
pub use scheduler::{PlaybackScheduler, ScheduledBuffer};
pub use service::{LiveConfig, LiveService};
pub use state::{LiveState, SpeakingTracker};
pub use transport::{LiveConnector, LiveTransport, WsConnector};
pub use volume::VolumeMeter;
