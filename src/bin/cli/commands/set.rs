use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{paint, Color};

pub fn run_use(app: &mut App, set: Option<&str>, use_color: bool) -> Result<()> {
    let Some(reference) = set else {
        app.repo.set_active(None);
        println!("No active set");
        return Ok(());
    };

    let (id, name) = {
        let set = app.find_set(reference)?;
        (set.id.clone(), set.name.clone())
    };
    app.repo.set_active(Some(&id));
    println!("Active set: {}", paint(&name, Color::BOLD, use_color));
    Ok(())
}

pub fn run_delete(app: &mut App, set: &str, use_color: bool) -> Result<()> {
    let (id, name) = {
        let set = app.find_set(set)?;
        (set.id.clone(), set.name.clone())
    };
    app.repo.delete_set(&id);
    println!("Deleted set {}", paint(&name, Color::BOLD, use_color));

    if let Some(active) = app.repo.active_set() {
        println!("Active set: {}", active.name);
    }
    Ok(())
}
