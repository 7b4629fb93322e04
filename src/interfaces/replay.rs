use crate::application::registry::GameRegistry;
use crate::domain::ids::BoardId;
use crate::error::Result;
use crate::interfaces::csv::command_reader::Command;
use std::collections::HashMap;
use tracing::debug;

/// Applies script commands to a registry, resolving board labels to ids.
pub struct ScriptRunner<'a> {
    registry: &'a GameRegistry,
    labels: HashMap<String, BoardId>,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(registry: &'a GameRegistry) -> Self {
        Self {
            registry,
            labels: HashMap::new(),
        }
    }

    /// The id bound to `label`; an unbound label names a board id directly.
    pub fn board_id(&self, label: &str) -> BoardId {
        self.labels
            .get(label)
            .cloned()
            .unwrap_or_else(|| BoardId::from(label))
    }

    pub async fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::RegisterUser { user, name } => {
                self.registry.register_user(&user, &name).await?;
            }
            Command::CreateBoard {
                creator,
                label,
                entry_fee,
                event_name,
            } => {
                let board = self
                    .registry
                    .create_board(&creator, &event_name, entry_fee)
                    .await?;
                debug!(%label, board_id = %board.board_id, "Label bound");
                self.labels.insert(label, board.board_id);
            }
            Command::Join {
                user,
                label,
                square,
            } => {
                let board_id = self.board_id(&label);
                self.registry.join_board(&board_id, &user, square).await?;
            }
            Command::Leave { user, label } => {
                let board_id = self.board_id(&label);
                self.registry.leave_board(&board_id, &user).await?;
            }
            Command::Score {
                actor,
                label,
                quarter,
                score,
            } => {
                let board_id = self.board_id(&label);
                self.registry
                    .update_score(&board_id, &actor, &quarter, &score)
                    .await?;
            }
            Command::Delete { actor, label } => {
                let board_id = self.board_id(&label);
                self.registry.delete_board(&board_id, &actor).await?;
                self.labels.remove(&label);
            }
        }
        Ok(())
    }
}
