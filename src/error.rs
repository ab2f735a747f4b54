/// Reasons a graph dataset is rejected at load time.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
	#[error("malformed graph data: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("invalid color `{0}`")]
	InvalidColor(String),

	#[error("duplicate node id `{0}`")]
	DuplicateNode(String),

	#[error("node `{node}` references unknown parent `{parent}`")]
	UnknownParent { node: String, parent: String },

	#[error("node `{node}` lists unknown tool `{tool}`")]
	UnknownTool { node: String, tool: String },

	#[error("link {from} -> {to} references unknown node `{missing}`")]
	UnknownLinkEndpoint {
		from: String,
		to: String,
		missing: String,
	},

	#[error("dimension `{0}` has no accent color")]
	MissingDimensionColor(String),
}

/// All errors the voice session can surface.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
	#[error("voice agent credentials are not configured")]
	Config,

	#[error("session request rejected: {0}")]
	Auth(String),

	#[error("microphone unavailable: {0}")]
	Capture(String),

	#[error("connection error: {0}")]
	Channel(String),

	#[error("audio output unavailable: {0}")]
	Output(String),

	#[error("undecodable audio: {0}")]
	Decode(String),

	#[error("malformed agent message: {0}")]
	Protocol(String),
}
