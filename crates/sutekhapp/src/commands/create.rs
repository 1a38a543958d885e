use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::NewCardSet;
use crate::store::{transaction, DataStore};

pub fn run<S: DataStore>(store: &mut S, new: NewCardSet) -> Result<CmdResult> {
    let id = transaction(store, |db| db.insert_card_set(new))?;
    let card_set = store.db().get_card_set(id)?.clone();

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Card set created: {}",
        card_set.name
    )));
    result.affected_card_sets.push(card_set);
    Ok(result)
}
