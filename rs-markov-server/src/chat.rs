use rs_markov_core::Engine;
use rs_markov_core::persistence::SnapshotStore;

/// What the adapter should do after handling one chat message.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
	/// Send this sentence back to the channel.
	Say(String),
	/// The save command was handled; `true` if the snapshot was written.
	Saved(bool),
	/// The message was only learned from.
	Silent,
}

/// Routes raw chat messages to the engine.
///
/// - The save command flushes the table immediately
/// - A message containing the trigger (case-insensitive) gets a generated
///   sentence, then is learned with the trigger blanked out
/// - Anything else is learned silently
#[derive(Clone, Debug)]
pub struct ChatRouter {
	trigger: String,
	save_command: String,
}

impl ChatRouter {
	pub fn new(trigger: &str, save_command: &str) -> Self {
		Self {
			trigger: trigger.to_lowercase(),
			save_command: save_command.to_owned(),
		}
	}

	pub fn handle<S: SnapshotStore>(&self, engine: &mut Engine<S>, message: &str) -> Reply {
		if message == self.save_command {
			return Reply::Saved(engine.flush_now());
		}

		if !self.trigger.is_empty() && message.to_lowercase().contains(&self.trigger) {
			let sentence = engine.generate();
			engine.train(&message.replacen(&self.trigger, " ", 1));
			return Reply::Say(sentence);
		}

		engine.train(message);
		Reply::Silent
	}
}
