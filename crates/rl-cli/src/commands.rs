//! Line commands understood by the headless driver.

use glam::Vec3;
use rl_core::{Color, ManipulatorMode, Ray};
use rl_editor::{ItemSelector, ShortcutAction, ShortcutMap};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { selector: ItemSelector, position: Vec3 },
    Pick(Ray),
    Select(String),
    Deselect,
    Mode(ManipulatorMode),
    Key(ShortcutAction),
    Delete,
    /// Move the selected item the way a manipulator drag would.
    Drag(Vec3),
    Floor(Color),
    Wall(Color),
    Save,
    Load,
    List,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  add <menu-value> [x y z]     place an item (sofa, chair, table, models/x.glb)
  pick <ox oy oz dx dy dz>     select whatever the ray hits first
  select <id> | deselect
  mode <translate|rotate|scale>
  key <key> [ctrl] [meta] [shift]
  delete                       delete the selected item
  drag <x y z>                 move the selected item
  floor <#hex> | wall <#hex>
  save | load | list | help | quit";

fn floats<const N: usize>(args: &[&str]) -> Result<[f32; N], String> {
    if args.len() != N {
        return Err(format!("expected {N} numbers, got {}", args.len()));
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.parse().map_err(|_| format!("not a number: {arg}"))?;
    }
    Ok(out)
}

fn color(args: &[&str]) -> Result<Color, String> {
    let [hex] = args else {
        return Err("expected one color".to_string());
    };
    Color::from_hex(hex).ok_or_else(|| format!("not a color: {hex}"))
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = words.split_first() else {
        return Ok(None);
    };
    if head.starts_with('#') {
        return Ok(None);
    }

    let cmd = match head {
        "add" => {
            let Some((&value, rest)) = args.split_first() else {
                return Err("add needs a menu value".to_string());
            };
            let position = if rest.is_empty() {
                Vec3::ZERO
            } else {
                Vec3::from_array(floats::<3>(rest)?)
            };
            Command::Add {
                selector: ItemSelector::from_menu_value(value),
                position,
            }
        }
        "pick" => {
            let [ox, oy, oz, dx, dy, dz] = floats::<6>(args)?;
            let direction = Vec3::new(dx, dy, dz);
            if direction.length_squared() == 0.0 {
                return Err("ray direction must be non-zero".to_string());
            }
            Command::Pick(Ray::new(Vec3::new(ox, oy, oz), direction))
        }
        "select" => match args {
            [id] => Command::Select((*id).to_string()),
            _ => return Err("select needs an item id".to_string()),
        },
        "deselect" => Command::Deselect,
        "mode" => {
            let name = args.first().copied().unwrap_or_default();
            Command::Mode(ManipulatorMode::parse(name).ok_or_else(|| format!("unknown mode: {name}"))?)
        }
        "key" => {
            let Some((&key, mods)) = args.split_first() else {
                return Err("key needs a key name".to_string());
            };
            let has = |m: &str| mods.iter().any(|a| a.eq_ignore_ascii_case(m));
            ShortcutMap::resolve(key, has("ctrl"), has("shift"), has("alt"), has("meta"))
                .map(Command::Key)
                .ok_or_else(|| format!("no shortcut bound to {key}"))?
        }
        "delete" => Command::Delete,
        "drag" => Command::Drag(Vec3::from_array(floats::<3>(args)?)),
        "floor" => Command::Floor(color(args)?),
        "wall" => Command::Wall(color(args)?),
        "save" => Command::Save,
        "load" => Command::Load,
        "list" | "ls" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(cmd))
}
