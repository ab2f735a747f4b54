mod hud_card;
mod universe;
mod voice_button;

pub use hud_card::HudCard;
pub use universe::UniverseCanvas;
pub use voice_button::VoiceButton;
