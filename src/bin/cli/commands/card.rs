use anyhow::{bail, Result};

use flashcard_ai_lib::flashcards::NewFlashcard;

use crate::app::{find_card, App};
use crate::OutputFormat;

pub fn run_add(app: &mut App, set: Option<&str>, front: &str, back: &str, format: &OutputFormat) -> Result<()> {
    let set_id = app.resolve_set(set)?.id.clone();

    let Some(card_id) = app.repo.add_card(&set_id, NewFlashcard::new(front, back)) else {
        bail!("Set disappeared while adding the card");
    };
    let position = app
        .repo
        .get_set(&set_id)
        .and_then(|s| s.flashcards.iter().position(|c| c.id == card_id))
        .map_or(0, |i| i + 1);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "setId": set_id,
                "cardId": card_id,
                "number": position,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Added card {}", position),
    }
    Ok(())
}

pub fn run_edit(
    app: &mut App,
    set: Option<&str>,
    card: &str,
    front: Option<&str>,
    back: Option<&str>,
) -> Result<()> {
    if front.is_none() && back.is_none() {
        bail!("Nothing to change: pass --front and/or --back");
    }

    let (set_id, card_id, new_front, new_back) = {
        let set = app.resolve_set(set)?;
        let card = find_card(set, card)?;
        (
            set.id.clone(),
            card.id.clone(),
            front.unwrap_or(&card.front).to_string(),
            back.unwrap_or(&card.back).to_string(),
        )
    };

    app.repo.update_card(&set_id, &card_id, &new_front, &new_back);
    println!("Updated card");
    Ok(())
}

pub fn run_delete(app: &mut App, set: Option<&str>, card: &str) -> Result<()> {
    let (set_id, card_id) = {
        let set = app.resolve_set(set)?;
        (set.id.clone(), find_card(set, card)?.id.clone())
    };

    app.repo.delete_card(&set_id, &card_id);
    println!("Deleted card");
    Ok(())
}
