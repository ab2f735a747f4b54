//! Browser backend: `fetch` for the signed URL, `getUserMedia` + `MediaRecorder`
//! for the microphone, Web Audio for playback and a `WebSocket` for the channel.

use std::rc::Rc;

use js_sys::Uint8Array;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
	AudioBufferSourceNode, AudioContext, AudioContextOptions, AudioContextState,
	AudioScheduledSourceNode, BlobEvent, CloseEvent, Event, Headers, MediaRecorder, MediaStream,
	MediaStreamConstraints, MediaStreamTrack, MessageEvent, RecordingState, Request, RequestInit,
	Response, WebSocket,
};

use super::protocol;
use super::session::{
	AudioOutput, CaptureHandle, DuplexChannel, EventSink, SessionEvent, VoiceBackend,
};
use crate::config::Credentials;
use crate::error::VoiceError;

fn describe(value: JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Delivers events on a fresh task so callbacks never re-enter the session.
fn deferred(sink: EventSink) -> EventSink {
	Rc::new(move |event| {
		let sink = sink.clone();
		spawn_local(async move { sink(event) });
	})
}

pub struct WebBackend;

impl VoiceBackend for WebBackend {
	type Channel = WebChannel;
	type Capture = WebCapture;
	type Output = WebOutput;

	fn fetch_signed_url(
		&self,
		request_url: &str,
		credentials: &Credentials,
	) -> impl Future<Output = Result<String, VoiceError>> {
		let (url, key) = (request_url.to_owned(), credentials.api_key.clone());
		async move {
			let auth = |e: JsValue| VoiceError::Auth(describe(e));
			let window = web_sys::window().ok_or_else(|| VoiceError::Auth("no window".into()))?;

			let headers = Headers::new().map_err(auth)?;
			headers.set("xi-api-key", &key).map_err(auth)?;
			let init = RequestInit::new();
			init.set_method("GET");
			init.set_headers(&headers);
			let request = Request::new_with_str_and_init(&url, &init).map_err(auth)?;

			let response: Response = JsFuture::from(window.fetch_with_request(&request))
				.await
				.map_err(auth)?
				.dyn_into()
				.map_err(auth)?;
			if !response.ok() {
				let status = response.status();
				return Err(VoiceError::Auth(format!("signed-url request returned {status}")));
			}
			let body = JsFuture::from(response.text().map_err(auth)?).await.map_err(auth)?;
			protocol::parse_signed_url(&body.as_string().unwrap_or_default())
		}
	}

	fn acquire_capture(
		&self,
		sink: EventSink,
	) -> impl Future<Output = Result<WebCapture, VoiceError>> {
		async move {
			let capture = |e: JsValue| VoiceError::Capture(describe(e));
			let window = web_sys::window().ok_or_else(|| VoiceError::Capture("no window".into()))?;
			let devices = window.navigator().media_devices().map_err(capture)?;

			let constraints = MediaStreamConstraints::new();
			constraints.set_audio(&JsValue::TRUE);
			let request = devices
				.get_user_media_with_constraints(&constraints)
				.map_err(capture)?;
			let stream: MediaStream = JsFuture::from(request)
				.await
				.map_err(capture)?
				.dyn_into()
				.map_err(capture)?;

			let recorder = match MediaRecorder::new_with_media_stream(&stream) {
				Ok(recorder) => recorder,
				Err(e) => {
					stop_tracks(&stream);
					return Err(capture(e));
				}
			};
			let sink = deferred(sink);
			let on_data = Closure::<dyn FnMut(BlobEvent)>::new(move |event: BlobEvent| {
				let Some(blob) = event.data() else {
					return;
				};
				let sink = sink.clone();
				spawn_local(async move {
					match JsFuture::from(blob.array_buffer()).await {
						Ok(buffer) => {
							sink(SessionEvent::CaptureChunk(Uint8Array::new(&buffer).to_vec()))
						}
						Err(e) => warn!("unreadable microphone chunk: {}", describe(e)),
					}
				});
			});
			recorder.set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));

			Ok(WebCapture {
				stream,
				recorder,
				_on_data: on_data,
			})
		}
	}

	fn open_output(&self, sample_rate: f32, sink: EventSink) -> Result<WebOutput, VoiceError> {
		let options = AudioContextOptions::new();
		options.set_sample_rate(sample_rate);
		let context = AudioContext::new_with_context_options(&options)
			.map_err(|e| VoiceError::Output(describe(e)))?;
		Ok(WebOutput {
			context,
			sample_rate,
			sink: deferred(sink),
			current: None,
			on_ended: None,
		})
	}

	fn open_channel(&self, url: &str, sink: EventSink) -> Result<WebChannel, VoiceError> {
		let socket = WebSocket::new(url).map_err(|e| VoiceError::Channel(describe(e)))?;
		let sink = deferred(sink);

		let on_open = Closure::<dyn FnMut()>::new({
			let sink = sink.clone();
			move || sink(SessionEvent::Opened)
		});
		let on_message = Closure::<dyn FnMut(MessageEvent)>::new({
			let sink = sink.clone();
			move |event: MessageEvent| match event.data().as_string() {
				Some(text) => sink(SessionEvent::Message(text)),
				None => debug!("ignoring binary frame"),
			}
		});
		let on_error = Closure::<dyn FnMut(Event)>::new({
			let sink = sink.clone();
			move |_: Event| sink(SessionEvent::Error("websocket error".into()))
		});
		let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
			debug!("websocket closed: {} {}", event.code(), event.reason());
			sink(SessionEvent::Closed)
		});

		socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
		socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
		socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));
		socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

		Ok(WebChannel {
			socket,
			_callbacks: (on_open, on_message, on_error, on_close),
		})
	}
}

type SocketCallbacks = (
	Closure<dyn FnMut()>,
	Closure<dyn FnMut(MessageEvent)>,
	Closure<dyn FnMut(Event)>,
	Closure<dyn FnMut(CloseEvent)>,
);

pub struct WebChannel {
	socket: WebSocket,
	_callbacks: SocketCallbacks,
}

impl DuplexChannel for WebChannel {
	fn send(&self, text: &str) -> Result<(), VoiceError> {
		self.socket
			.send_with_str(text)
			.map_err(|e| VoiceError::Channel(describe(e)))
	}

	fn close(&self) {
		self.socket.set_onopen(None);
		self.socket.set_onmessage(None);
		self.socket.set_onerror(None);
		self.socket.set_onclose(None);
		if let Err(e) = self.socket.close() {
			warn!("websocket close failed: {}", describe(e));
		}
	}
}

pub struct WebCapture {
	stream: MediaStream,
	recorder: MediaRecorder,
	_on_data: Closure<dyn FnMut(BlobEvent)>,
}

fn stop_tracks(stream: &MediaStream) {
	for track in stream.get_tracks().iter() {
		if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
			track.stop();
		}
	}
}

impl CaptureHandle for WebCapture {
	fn start(&mut self, chunk_ms: i32) -> Result<(), VoiceError> {
		self.recorder
			.start_with_time_slice(chunk_ms)
			.map_err(|e| VoiceError::Capture(describe(e)))
	}

	fn stop(&mut self) {
		self.recorder.set_ondataavailable(None);
		if self.recorder.state() != RecordingState::Inactive {
			if let Err(e) = self.recorder.stop() {
				warn!("recorder stop failed: {}", describe(e));
			}
		}
		stop_tracks(&self.stream);
	}
}

pub struct WebOutput {
	context: AudioContext,
	sample_rate: f32,
	sink: EventSink,
	current: Option<AudioBufferSourceNode>,
	on_ended: Option<Closure<dyn FnMut()>>,
}

impl WebOutput {
	fn detach_current(&mut self) -> Option<AudioBufferSourceNode> {
		let source = self.current.take()?;
		AudioScheduledSourceNode::set_onended(&source, None);
		Some(source)
	}

	/// Autoplay policy may leave the context suspended; a failed resume means the
	/// clip with `ticket` will never end on its own.
	fn resume_if_suspended(&self, ticket: u64) {
		if self.context.state() != AudioContextState::Suspended {
			return;
		}
		let sink = self.sink.clone();
		let failed = move |e: JsValue| {
			sink(SessionEvent::PlaybackFailed(ticket, VoiceError::Output(describe(e))))
		};
		match self.context.resume() {
			Ok(promise) => spawn_local(async move {
				if let Err(e) = JsFuture::from(promise).await {
					failed(e);
				}
			}),
			Err(e) => failed(e),
		}
	}
}

impl AudioOutput for WebOutput {
	fn play(&mut self, clip: Vec<u8>, ticket: u64) -> Result<(), VoiceError> {
		let decode = |e: JsValue| VoiceError::Decode(describe(e));
		let mut samples = protocol::pcm16_to_f32(&clip);
		if samples.is_empty() {
			return Err(VoiceError::Decode("empty clip".into()));
		}
		let buffer = self
			.context
			.create_buffer(1, samples.len() as u32, self.sample_rate)
			.map_err(decode)?;
		buffer.copy_to_channel(&mut samples, 0).map_err(decode)?;

		let output = |e: JsValue| VoiceError::Output(describe(e));
		let source = self.context.create_buffer_source().map_err(output)?;
		source.set_buffer(Some(&buffer));
		source
			.connect_with_audio_node(&self.context.destination())
			.map_err(output)?;

		let sink = self.sink.clone();
		let on_ended =
			Closure::<dyn FnMut()>::new(move || sink(SessionEvent::PlaybackEnded(ticket)));
		AudioScheduledSourceNode::set_onended(&source, Some(on_ended.as_ref().unchecked_ref()));
		AudioScheduledSourceNode::start(&source).map_err(output)?;

		self.detach_current();
		self.current = Some(source);
		self.on_ended = Some(on_ended);
		self.resume_if_suspended(ticket);
		Ok(())
	}

	fn stop(&mut self) {
		if let Some(source) = self.detach_current() {
			if let Err(e) = AudioScheduledSourceNode::stop(&source) {
				debug!("playback already stopped: {}", describe(e));
			}
		}
		self.on_ended = None;
	}

	fn close(&mut self) {
		self.stop();
		match self.context.close() {
			Ok(promise) => spawn_local(async move {
				if let Err(e) = JsFuture::from(promise).await {
					warn!("audio context close failed: {}", describe(e));
				}
			}),
			Err(e) => warn!("audio context close failed: {}", describe(e)),
		}
	}
}
