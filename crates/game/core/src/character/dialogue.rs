use crate::script::ScriptThread;

/// Identifier of the NPC a character is talking to.
pub type NpcId = u16;

/// A running conversation with an NPC. At most one per character.
pub struct NpcDialogue {
    pub(super) thread: Box<dyn ScriptThread>,
    pub(super) npc: NpcId,
}

impl NpcDialogue {
    pub fn npc(&self) -> NpcId {
        self.npc
    }
}

impl std::fmt::Debug for NpcDialogue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NpcDialogue").field("npc", &self.npc).finish_non_exhaustive()
    }
}
