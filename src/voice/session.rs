//! Voice session lifecycle: connect, stream the microphone, play the agent's
//! replies strictly in order, and tear every resource down together.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::{debug, error, info, warn};

use super::protocol::{self, AgentMessage};
use crate::config::{Credentials, VoiceConfig};
use crate::error::VoiceError;

/// Everything a backend reports back to the session.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
	/// The duplex channel finished its handshake.
	Opened,
	/// One inbound text frame.
	Message(String),
	/// The channel failed.
	Error(String),
	/// The channel was closed by the other side.
	Closed,
	/// One captured microphone slice.
	CaptureChunk(Vec<u8>),
	/// The clip started with this ticket finished playing.
	PlaybackEnded(u64),
	/// The clip started with this ticket could not be played.
	PlaybackFailed(u64, VoiceError),
}

pub type EventSink = Rc<dyn Fn(SessionEvent)>;

pub trait DuplexChannel {
	fn send(&self, text: &str) -> Result<(), VoiceError>;
	fn close(&self);
}

pub trait CaptureHandle {
	/// Begins emitting [`SessionEvent::CaptureChunk`] every `chunk_ms`.
	fn start(&mut self, chunk_ms: i32) -> Result<(), VoiceError>;
	/// Stops recording and releases the device.
	fn stop(&mut self);
}

pub trait AudioOutput {
	/// Decodes and starts one clip; completion is reported with `ticket`.
	fn play(&mut self, clip: Vec<u8>, ticket: u64) -> Result<(), VoiceError>;
	/// Silences whatever is playing. Its completion callback may still fire.
	fn stop(&mut self);
	fn close(&mut self);
}

/// Acquires the resources a session owns.
pub trait VoiceBackend {
	type Channel: DuplexChannel;
	type Capture: CaptureHandle;
	type Output: AudioOutput;

	fn fetch_signed_url(
		&self,
		request_url: &str,
		credentials: &Credentials,
	) -> impl Future<Output = Result<String, VoiceError>>;

	fn acquire_capture(
		&self,
		sink: EventSink,
	) -> impl Future<Output = Result<Self::Capture, VoiceError>>;

	fn open_output(&self, sample_rate: f32, sink: EventSink) -> Result<Self::Output, VoiceError>;

	fn open_channel(&self, url: &str, sink: EventSink) -> Result<Self::Channel, VoiceError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
	#[default]
	Idle,
	Connecting,
	Connected,
	Closed,
	Failed(VoiceError),
}

impl SessionState {
	pub fn is_busy(&self) -> bool {
		matches!(self, Self::Connecting | Self::Connected)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionStatus {
	pub state: SessionState,
	pub speaking: bool,
}

type Listener = Rc<dyn Fn(&SessionStatus)>;

struct Session<B: VoiceBackend> {
	backend: Rc<B>,
	config: VoiceConfig,
	state: SessionState,
	/// Bumped on every start and end; async work carrying an older value is stale.
	epoch: u64,
	channel: Option<B::Channel>,
	capture: Option<B::Capture>,
	output: Option<B::Output>,
	queue: VecDeque<String>,
	draining: bool,
	speaking: bool,
	/// Identifies the clip currently playing; bumped to orphan late completions.
	ticket: u64,
	listener: Option<Listener>,
	last_status: SessionStatus,
}

impl<B: VoiceBackend> Session<B> {
	fn status(&self) -> SessionStatus {
		SessionStatus {
			state: self.state.clone(),
			speaking: self.speaking,
		}
	}

	fn is_current(&self, epoch: u64) -> bool {
		epoch == self.epoch && self.state.is_busy()
	}

	fn begin(&mut self) -> Option<u64> {
		if self.state.is_busy() {
			return None;
		}
		self.epoch += 1;
		self.state = SessionState::Connecting;
		info!("voice session connecting");
		Some(self.epoch)
	}

	fn attach_capture(&mut self, epoch: u64, mut capture: B::Capture) -> bool {
		if !self.is_current(epoch) {
			capture.stop();
			return false;
		}
		self.capture = Some(capture);
		true
	}

	fn attach_output(&mut self, epoch: u64, mut output: B::Output) -> bool {
		if !self.is_current(epoch) {
			output.close();
			return false;
		}
		self.output = Some(output);
		true
	}

	fn attach_channel(&mut self, epoch: u64, channel: B::Channel) -> bool {
		if !self.is_current(epoch) {
			channel.close();
			return false;
		}
		self.channel = Some(channel);
		true
	}

	fn handle(&mut self, epoch: u64, event: SessionEvent) {
		if !self.is_current(epoch) {
			debug!("dropping stale voice event {event:?}");
			return;
		}
		match event {
			SessionEvent::Opened => self.opened(),
			SessionEvent::Message(text) => self.message(&text),
			SessionEvent::CaptureChunk(bytes) => self.forward_capture(&bytes),
			SessionEvent::PlaybackEnded(ticket) => {
				if ticket == self.ticket && self.draining {
					self.drain();
				}
			}
			SessionEvent::PlaybackFailed(ticket, err) => {
				if ticket == self.ticket && self.draining {
					warn!("dropping agent audio: {err}");
					self.drain();
				}
			}
			SessionEvent::Error(reason) => self.fail(VoiceError::Channel(reason)),
			SessionEvent::Closed => {
				info!("voice channel closed by agent");
				self.release();
				self.state = SessionState::Closed;
			}
		}
	}

	fn opened(&mut self) {
		if self.state != SessionState::Connecting {
			return;
		}
		let chunk_ms = self.config.chunk_ms;
		let started = match &mut self.capture {
			Some(capture) => capture.start(chunk_ms),
			None => Err(VoiceError::Capture("no capture device attached".into())),
		};
		match started {
			Ok(()) => {
				self.state = SessionState::Connected;
				info!("voice session connected");
			}
			Err(err) => self.fail(err),
		}
	}

	fn message(&mut self, text: &str) {
		if self.state != SessionState::Connected {
			return;
		}
		match protocol::parse_agent_message(text) {
			Ok(AgentMessage::Audio(chunk)) => {
				self.queue.push_back(chunk);
				if !self.draining {
					self.drain();
				}
			}
			Ok(AgentMessage::Interruption) => self.interrupt(),
			Ok(AgentMessage::Other) => debug!("ignoring agent frame"),
			Err(err) => warn!("{err}"),
		}
	}

	fn forward_capture(&self, bytes: &[u8]) {
		if self.state != SessionState::Connected {
			return;
		}
		if let Some(channel) = &self.channel {
			if let Err(err) = channel.send(&protocol::encode_audio_chunk(bytes)) {
				warn!("dropping microphone chunk: {err}");
			}
		}
	}

	/// Starts the next playable clip, or goes quiet once the queue is empty.
	fn drain(&mut self) {
		let Some(output) = &mut self.output else {
			self.queue.clear();
			self.draining = false;
			self.speaking = false;
			return;
		};
		while let Some(chunk) = self.queue.pop_front() {
			let started = protocol::decode_audio(&chunk).and_then(|clip| {
				self.ticket += 1;
				output.play(clip, self.ticket)
			});
			match started {
				Ok(()) => {
					self.draining = true;
					self.speaking = true;
					return;
				}
				Err(err) => warn!("dropping agent audio: {err}"),
			}
		}
		self.draining = false;
		self.speaking = false;
	}

	fn interrupt(&mut self) {
		debug!("agent interrupted; dropping {} queued clips", self.queue.len());
		self.queue.clear();
		if let Some(output) = &mut self.output {
			output.stop();
		}
		self.ticket += 1;
		self.draining = false;
		self.speaking = false;
	}

	/// Returns every acquired resource. Safe to call with nothing acquired.
	fn release(&mut self) {
		if let Some(channel) = self.channel.take() {
			channel.close();
		}
		if let Some(mut capture) = self.capture.take() {
			capture.stop();
		}
		if let Some(mut output) = self.output.take() {
			output.close();
		}
		self.queue.clear();
		self.ticket += 1;
		self.draining = false;
		self.speaking = false;
	}

	fn fail(&mut self, err: VoiceError) {
		error!("voice session failed: {err}");
		self.release();
		self.state = SessionState::Failed(err);
	}

	fn end(&mut self) {
		if !self.state.is_busy() {
			return;
		}
		self.epoch += 1;
		self.release();
		self.state = SessionState::Closed;
		info!("voice session ended");
	}
}

/// Shared handle to one voice session. Clones refer to the same session.
pub struct VoiceSession<B: VoiceBackend> {
	inner: Rc<RefCell<Session<B>>>,
}

impl<B: VoiceBackend> Clone for VoiceSession<B> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<B: VoiceBackend + 'static> VoiceSession<B> {
	pub fn new(backend: B, config: VoiceConfig) -> Self {
		Self {
			inner: Rc::new(RefCell::new(Session {
				backend: Rc::new(backend),
				config,
				state: SessionState::Idle,
				epoch: 0,
				channel: None,
				capture: None,
				output: None,
				queue: VecDeque::new(),
				draining: false,
				speaking: false,
				ticket: 0,
				listener: None,
				last_status: SessionStatus::default(),
			})),
		}
	}

	/// Called after every status change.
	pub fn on_status(&self, listener: impl Fn(&SessionStatus) + 'static) {
		self.inner.borrow_mut().listener = Some(Rc::new(listener));
	}

	pub fn status(&self) -> SessionStatus {
		self.inner.borrow().status()
	}

	/// Connects unless a session is already connecting or connected. The
	/// session reaches `Connected` once the channel reports it is open.
	pub async fn start(&self) -> Result<(), VoiceError> {
		let Some(epoch) = self.inner.borrow_mut().begin() else {
			debug!("voice session already running");
			return Ok(());
		};
		self.notify();

		let result = self.connect(epoch).await;
		if let Err(err) = &result {
			let mut session = self.inner.borrow_mut();
			if !session.is_current(epoch) {
				return Ok(());
			}
			session.fail(err.clone());
		}
		self.notify();
		result
	}

	async fn connect(&self, epoch: u64) -> Result<(), VoiceError> {
		let (backend, config) = {
			let session = self.inner.borrow();
			(session.backend.clone(), session.config.clone())
		};
		let credentials = config.credentials()?;

		let url = backend
			.fetch_signed_url(&config.signed_url_request(&credentials), &credentials)
			.await?;
		if !self.inner.borrow().is_current(epoch) {
			return Ok(());
		}

		let capture = backend.acquire_capture(self.sink(epoch)).await?;
		if !self.inner.borrow_mut().attach_capture(epoch, capture) {
			return Ok(());
		}

		let output = backend.open_output(config.sample_rate, self.sink(epoch))?;
		if !self.inner.borrow_mut().attach_output(epoch, output) {
			return Ok(());
		}

		let channel = backend.open_channel(&url, self.sink(epoch))?;
		self.inner.borrow_mut().attach_channel(epoch, channel);
		Ok(())
	}

	/// Ends a connecting or connected session and releases everything it holds.
	pub fn end(&self) {
		self.inner.borrow_mut().end();
		self.notify();
	}

	fn handle(&self, epoch: u64, event: SessionEvent) {
		self.inner.borrow_mut().handle(epoch, event);
		self.notify();
	}

	fn sink(&self, epoch: u64) -> EventSink {
		let weak = Rc::downgrade(&self.inner);
		Rc::new(move |event| {
			if let Some(inner) = weak.upgrade() {
				VoiceSession { inner }.handle(epoch, event);
			}
		})
	}

	fn notify(&self) {
		let (listener, status) = {
			let mut session = self.inner.borrow_mut();
			let status = session.status();
			if status == session.last_status {
				return;
			}
			session.last_status = status.clone();
			(session.listener.clone(), status)
		};
		if let Some(listener) = listener {
			listener(&status);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::future::ready;

	use base64::Engine;
	use base64::engine::general_purpose::STANDARD;
	use futures::executor::block_on;

	use super::*;

	#[derive(Default)]
	struct Registry {
		acquired: Vec<&'static str>,
		released: Vec<&'static str>,
		fetches: usize,
		sent: Vec<String>,
		played: Vec<(u64, Vec<u8>)>,
		stops: usize,
		capture_started: bool,
		sink: Option<EventSink>,
	}

	type Shared = Rc<RefCell<Registry>>;

	struct FakeChannel(Shared);

	impl DuplexChannel for FakeChannel {
		fn send(&self, text: &str) -> Result<(), VoiceError> {
			self.0.borrow_mut().sent.push(text.into());
			Ok(())
		}

		fn close(&self) {
			self.0.borrow_mut().released.push("channel");
		}
	}

	struct FakeCapture(Shared);

	impl CaptureHandle for FakeCapture {
		fn start(&mut self, _chunk_ms: i32) -> Result<(), VoiceError> {
			self.0.borrow_mut().capture_started = true;
			Ok(())
		}

		fn stop(&mut self) {
			self.0.borrow_mut().released.push("capture");
		}
	}

	struct FakeOutput(Shared);

	impl AudioOutput for FakeOutput {
		fn play(&mut self, clip: Vec<u8>, ticket: u64) -> Result<(), VoiceError> {
			if clip.is_empty() {
				return Err(VoiceError::Decode("empty clip".into()));
			}
			self.0.borrow_mut().played.push((ticket, clip));
			Ok(())
		}

		fn stop(&mut self) {
			self.0.borrow_mut().stops += 1;
		}

		fn close(&mut self) {
			self.0.borrow_mut().released.push("output");
		}
	}

	struct FakeBackend {
		registry: Shared,
		signed_url: Result<String, VoiceError>,
		capture: Result<(), VoiceError>,
		/// Runs while the microphone is being acquired.
		during_capture: RefCell<Option<Box<dyn FnOnce()>>>,
	}

	impl VoiceBackend for FakeBackend {
		type Channel = FakeChannel;
		type Capture = FakeCapture;
		type Output = FakeOutput;

		fn fetch_signed_url(
			&self,
			request_url: &str,
			_: &Credentials,
		) -> impl Future<Output = Result<String, VoiceError>> {
			assert!(request_url.ends_with("?agent_id=agent"));
			self.registry.borrow_mut().fetches += 1;
			ready(self.signed_url.clone())
		}

		fn acquire_capture(
			&self,
			_sink: EventSink,
		) -> impl Future<Output = Result<FakeCapture, VoiceError>> {
			if let Some(hook) = self.during_capture.borrow_mut().take() {
				hook();
			}
			ready(self.capture.clone().map(|()| {
				self.registry.borrow_mut().acquired.push("capture");
				FakeCapture(self.registry.clone())
			}))
		}

		fn open_output(
			&self,
			_sample_rate: f32,
			_sink: EventSink,
		) -> Result<FakeOutput, VoiceError> {
			self.registry.borrow_mut().acquired.push("output");
			Ok(FakeOutput(self.registry.clone()))
		}

		fn open_channel(&self, url: &str, sink: EventSink) -> Result<FakeChannel, VoiceError> {
			assert_eq!(url, "wss://agent.example/signed");
			let mut registry = self.registry.borrow_mut();
			registry.acquired.push("channel");
			registry.sink = Some(sink);
			Ok(FakeChannel(self.registry.clone()))
		}
	}

	fn backend() -> (FakeBackend, Shared) {
		let registry = Shared::default();
		let backend = FakeBackend {
			registry: registry.clone(),
			signed_url: Ok("wss://agent.example/signed".into()),
			capture: Ok(()),
			during_capture: RefCell::new(None),
		};
		(backend, registry)
	}

	fn config() -> VoiceConfig {
		VoiceConfig::with_credentials(Some("agent"), Some("key"))
	}

	fn emit(registry: &Shared, event: SessionEvent) {
		let sink = registry.borrow().sink.clone().unwrap();
		sink(event);
	}

	fn audio(bytes: &[u8]) -> SessionEvent {
		SessionEvent::Message(format!(
			r#"{{"type":"audio","audio":{{"chunk":"{}"}}}}"#,
			STANDARD.encode(bytes)
		))
	}

	fn connected() -> (VoiceSession<FakeBackend>, Shared) {
		let (backend, registry) = backend();
		let session = VoiceSession::new(backend, config());
		block_on(session.start()).unwrap();
		emit(&registry, SessionEvent::Opened);
		assert_eq!(session.status().state, SessionState::Connected);
		(session, registry)
	}

	fn last_ticket(registry: &Shared) -> u64 {
		registry.borrow().played.last().unwrap().0
	}

	fn assert_all_released(registry: &Shared) {
		let registry = registry.borrow();
		let mut acquired = registry.acquired.clone();
		let mut released = registry.released.clone();
		acquired.sort();
		released.sort();
		assert_eq!(acquired, released);
	}

	#[test]
	fn missing_credentials_fail_before_any_request() {
		let (backend, registry) = backend();
		let session = VoiceSession::new(backend, VoiceConfig::with_credentials(None, None));
		assert_eq!(block_on(session.start()), Err(VoiceError::Config));
		assert_eq!(session.status().state, SessionState::Failed(VoiceError::Config));
		assert_eq!(registry.borrow().fetches, 0);
		assert!(registry.borrow().acquired.is_empty());
	}

	#[test]
	fn rejected_signed_url_is_an_auth_error() {
		let (mut backend, registry) = backend();
		backend.signed_url = Err(VoiceError::Auth("401".into()));
		let session = VoiceSession::new(backend, config());
		assert!(matches!(block_on(session.start()), Err(VoiceError::Auth(_))));
		assert!(matches!(session.status().state, SessionState::Failed(VoiceError::Auth(_))));
		assert!(registry.borrow().acquired.is_empty());
	}

	#[test]
	fn denied_microphone_leaves_nothing_behind() {
		let (mut backend, registry) = backend();
		backend.capture = Err(VoiceError::Capture("denied".into()));
		let session = VoiceSession::new(backend, config());
		assert!(matches!(block_on(session.start()), Err(VoiceError::Capture(_))));
		assert!(registry.borrow().acquired.is_empty());
		assert!(registry.borrow().released.is_empty());
	}

	#[test]
	fn open_channel_starts_streaming_microphone() {
		let (session, registry) = connected();
		assert!(registry.borrow().capture_started);

		emit(&registry, SessionEvent::CaptureChunk(vec![1, 2, 3]));
		let expected = r#"{"user_audio_chunk":"AQID"}"#.to_string();
		assert_eq!(registry.borrow().sent, vec![expected]);
		assert!(!session.status().speaking);
	}

	#[test]
	fn agent_audio_plays_in_arrival_order() {
		let (session, registry) = connected();
		for clip in [[1u8], [2], [3]] {
			emit(&registry, audio(&clip));
		}
		assert_eq!(registry.borrow().played.len(), 1);
		assert!(session.status().speaking);

		for expected in [vec![1u8], vec![2], vec![3]] {
			assert_eq!(registry.borrow().played.last().unwrap().1, expected);
			assert!(session.status().speaking);
			emit(&registry, SessionEvent::PlaybackEnded(last_ticket(&registry)));
		}
		assert_eq!(registry.borrow().played.len(), 3);
		assert!(!session.status().speaking);
	}

	#[test]
	fn interruption_drops_queued_audio() {
		let (session, registry) = connected();
		for clip in [[1u8], [2], [3]] {
			emit(&registry, audio(&clip));
		}
		let first = last_ticket(&registry);

		emit(&registry, SessionEvent::Message(r#"{"type":"interruption"}"#.into()));
		assert!(!session.status().speaking);
		assert_eq!(registry.borrow().stops, 1);

		// the stopped clip still reports completion
		emit(&registry, SessionEvent::PlaybackEnded(first));
		assert_eq!(registry.borrow().played.len(), 1);
		assert!(!session.status().speaking);

		emit(&registry, audio(&[4]));
		assert_eq!(registry.borrow().played.last().unwrap().1, vec![4]);
	}

	#[test]
	fn undecodable_clip_is_skipped() {
		let (session, registry) = connected();
		let garbage = r#"{"type":"audio","audio":{"chunk":"@@@"}}"#;
		emit(&registry, SessionEvent::Message(garbage.into()));
		emit(&registry, audio(&[]));
		assert!(registry.borrow().played.is_empty());
		assert!(!session.status().speaking);

		emit(&registry, audio(&[9]));
		assert_eq!(registry.borrow().played.last().unwrap().1, vec![9]);

		let ticket = last_ticket(&registry);
		emit(
			&registry,
			SessionEvent::PlaybackFailed(ticket, VoiceError::Decode("bad".into())),
		);
		assert!(!session.status().speaking);
		assert_eq!(session.status().state, SessionState::Connected);
	}

	#[test]
	fn end_while_connecting_releases_everything() {
		let (backend, registry) = backend();
		let session = VoiceSession::new(backend, config());
		block_on(session.start()).unwrap();
		assert_eq!(session.status().state, SessionState::Connecting);

		session.end();
		assert_eq!(session.status().state, SessionState::Closed);
		assert_eq!(registry.borrow().acquired.len(), 3);
		assert_all_released(&registry);

		// a late handshake from the torn-down channel changes nothing
		emit(&registry, SessionEvent::Opened);
		assert_eq!(session.status().state, SessionState::Closed);
	}

	#[test]
	fn end_while_connected_releases_everything() {
		let (session, registry) = connected();
		emit(&registry, audio(&[1]));
		emit(&registry, audio(&[2]));
		session.end();
		assert_eq!(
			session.status(),
			SessionStatus {
				state: SessionState::Closed,
				speaking: false,
			}
		);
		assert_all_released(&registry);
	}

	#[test]
	fn channel_error_while_connecting_releases_everything() {
		let (backend, registry) = backend();
		let session = VoiceSession::new(backend, config());
		block_on(session.start()).unwrap();
		assert_eq!(session.status().state, SessionState::Connecting);

		emit(&registry, SessionEvent::Error("refused".into()));
		assert_eq!(
			session.status().state,
			SessionState::Failed(VoiceError::Channel("refused".into()))
		);
		assert_eq!(registry.borrow().acquired.len(), 3);
		assert_all_released(&registry);

		// the close that follows a failed handshake is not a second teardown
		emit(&registry, SessionEvent::Closed);
		assert_eq!(
			session.status().state,
			SessionState::Failed(VoiceError::Channel("refused".into()))
		);
		assert_eq!(registry.borrow().released.len(), 3);
	}

	#[test]
	fn agent_closing_the_channel_ends_the_session() {
		let (session, registry) = connected();
		emit(&registry, audio(&[1]));
		assert!(session.status().speaking);

		emit(&registry, SessionEvent::Closed);
		assert_eq!(
			session.status(),
			SessionStatus {
				state: SessionState::Closed,
				speaking: false,
			}
		);
		assert_eq!(registry.borrow().acquired.len(), 3);
		assert_all_released(&registry);
	}

	#[test]
	fn end_racing_start_settles_closed() {
		let (backend, registry) = backend();
		let session = VoiceSession::new(backend, config());
		let ender = session.clone();
		let hook: Box<dyn FnOnce()> = Box::new(move || ender.end());
		session
			.inner
			.borrow()
			.backend
			.during_capture
			.replace(Some(hook));

		assert_eq!(block_on(session.start()), Ok(()));
		assert_eq!(session.status().state, SessionState::Closed);
		assert_eq!(registry.borrow().acquired, vec!["capture"]);
		assert_all_released(&registry);
	}

	#[test]
	fn channel_error_tears_down_and_allows_retry() {
		let (session, registry) = connected();
		emit(&registry, audio(&[1]));
		emit(&registry, SessionEvent::Error("socket reset".into()));
		assert_eq!(
			session.status().state,
			SessionState::Failed(VoiceError::Channel("socket reset".into()))
		);
		assert!(!session.status().speaking);
		assert_all_released(&registry);

		block_on(session.start()).unwrap();
		assert_eq!(session.status().state, SessionState::Connecting);
		assert_eq!(registry.borrow().fetches, 2);
	}

	#[test]
	fn start_while_busy_and_end_while_idle_are_no_ops() {
		let (backend, registry) = backend();
		let session = VoiceSession::new(backend, config());
		session.end();
		assert_eq!(session.status().state, SessionState::Idle);

		block_on(session.start()).unwrap();
		block_on(session.start()).unwrap();
		assert_eq!(registry.borrow().fetches, 1);
		assert_eq!(registry.borrow().acquired.len(), 3);

		session.end();
		session.end();
		assert_eq!(registry.borrow().released.len(), 3);
	}

	#[test]
	fn listener_sees_each_transition_once() {
		let (backend, registry) = backend();
		let session = VoiceSession::new(backend, config());
		let seen = Rc::new(RefCell::new(Vec::new()));
		let log = seen.clone();
		session.on_status(move |status| log.borrow_mut().push(status.clone()));

		block_on(session.start()).unwrap();
		emit(&registry, SessionEvent::Opened);
		emit(&registry, audio(&[1]));
		emit(&registry, SessionEvent::CaptureChunk(vec![0]));
		session.end();

		let states: Vec<_> = seen
			.borrow()
			.iter()
			.map(|s| (s.state.clone(), s.speaking))
			.collect();
		assert_eq!(
			states,
			vec![
				(SessionState::Connecting, false),
				(SessionState::Connected, false),
				(SessionState::Connected, true),
				(SessionState::Closed, false),
			]
		);
	}
}
