//! `room-layout`: drive the room editor from stdin.
//!
//! Reads one command per line (see `help`) and prints the editor's notices
//! after each. Assets are read from `models_dir`; layouts are stored as JSON
//! files under `storage_dir`.

mod commands;

use commands::Command;
use rl_core::{EditorConfig, ItemId, SceneBackend, Transform};
use rl_editor::{FileStore, FsAssetFetcher, HeadlessEditor, RoomEditor};
use rl_render::{HeadlessControls, MemoryScene};
use tokio::io::{AsyncBufReadExt, BufReader};

type Editor = HeadlessEditor<FsAssetFetcher, FileStore>;

fn load_config() -> Result<EditorConfig, Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let mut config = EditorConfig::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().ok_or("--config needs a file")?;
                let text = std::fs::read_to_string(&path)?;
                config = EditorConfig::from_json(&text)?;
                log::info!("config loaded from {path}");
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }
    Ok(config)
}

fn print_items(editor: &Editor) {
    if editor.items().is_empty() {
        println!("(empty room)");
    }
    for item in editor.items() {
        let marker = if editor.selected() == Some(item.id) { "*" } else { " " };
        let p = item.transform.position;
        println!(
            "{marker} {:<12} {:<10} at ({:.2}, {:.2}, {:.2}) scale {:.2}",
            item.id.as_str(),
            item.label,
            p.x,
            p.y,
            p.z,
            item.transform.scale.x
        );
    }
}

/// Returns `false` when the session should end.
async fn run(editor: &mut Editor, cmd: Command) -> bool {
    match cmd {
        Command::Add { selector, position } => {
            let id = editor.add_item(selector, position).await;
            println!("added {id}");
        }
        Command::Pick(ray) => match editor.pointer_down(&ray) {
            Some(id) => println!("selected {id}"),
            None => println!("nothing hit"),
        },
        Command::Select(name) => {
            if !editor.select(ItemId::intern(&name)) {
                println!("no item {name}");
            }
        }
        Command::Deselect => editor.deselect(),
        Command::Mode(mode) => editor.set_mode(mode),
        Command::Key(action) => {
            // Failures already surface as notices.
            let _ = editor.apply_shortcut(action).await;
        }
        Command::Delete => {
            if let Ok(id) = editor.delete_selected() {
                println!("deleted {id}");
            }
        }
        Command::Drag(position) => {
            let Some(item) = editor.selected().and_then(|id| editor.registry().get(id)) else {
                println!("nothing selected");
                return true;
            };
            let handle = item.visual;
            let target = Transform {
                position,
                ..item.transform
            };
            editor.manipulator_drag_changed(true);
            editor.scene_mut().set_transform(handle, &target);
            editor.manipulator_drag_changed(false);
        }
        Command::Floor(color) => editor.set_floor_color(color),
        Command::Wall(color) => editor.set_wall_color(color),
        Command::Save => {
            let _ = editor.save_layout();
        }
        Command::Load => {
            let _ = editor.load_layout().await;
        }
        Command::List => print_items(editor),
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => return false,
    }
    true
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = load_config()?;

    let mut editor: Editor = RoomEditor::new(
        MemoryScene::new(),
        HeadlessControls::new(),
        FsAssetFetcher::new(config.models_dir.clone()),
        FileStore::new(config.storage_dir.clone()),
        &config,
    );
    if config.seed_sample_room {
        editor.populate_sample_room();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let keep_going = match commands::parse(&line) {
            Ok(Some(cmd)) => run(&mut editor, cmd).await,
            Ok(None) => true,
            Err(msg) => {
                println!("error: {msg}");
                true
            }
        };
        for notice in editor.take_notices() {
            println!("{notice}");
        }
        if !keep_going {
            break;
        }
    }
    Ok(())
}
