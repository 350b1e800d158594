//! # Wire Protocol
//!
//! JSON frames: a path-like intent name plus a body, answered with the
//! router's tagged response. Parsing is total over the canonical path set;
//! anything else is a protocol error that terminates only the offending
//! session.

use aeon_core::{EquipSlot, FollowerCommand, ItemKind, SkillName};
use aeon_engine::{AdminOp, BankOp, Intent};
use serde::Deserialize;

use crate::{NetError, NetResult};

/// One inbound frame as it appears on the wire.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientFrame {
    /// The intent path, e.g. `/action/gather`.
    pub path: String,
    /// The intent body; shape depends on the path.
    #[serde(default)]
    pub body: serde_json::Value,
}

/// A fully parsed inbound request.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    /// Establish a session against existing credentials.
    Login {
        /// Account name.
        username: String,
        /// Account password.
        pass: String,
    },
    /// Create credentials and establish a session.
    Register {
        /// Account name.
        username: String,
        /// Account password.
        pass: String,
    },
    /// A routed gameplay intent.
    Game(Intent),
}

#[derive(Deserialize)]
struct AuthBody {
    username: String,
    pass: String,
}

#[derive(Deserialize)]
struct MoveBody {
    x: f32,
    z: f32,
}

#[derive(Deserialize)]
struct TargetBody {
    target: String,
}

#[derive(Deserialize)]
struct RecipeBody {
    recipe: String,
}

#[derive(Deserialize)]
struct ItemBody {
    item: ItemKind,
}

#[derive(Deserialize)]
struct OptionalItemBody {
    #[serde(default)]
    item: Option<ItemKind>,
}

#[derive(Deserialize)]
struct SlotBody {
    slot: EquipSlot,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum BankAction {
    Deposit,
    Withdraw,
}

#[derive(Deserialize)]
struct BankBody {
    action: BankAction,
    item: ItemKind,
    #[serde(default = "one")]
    amount: u32,
}

#[derive(Deserialize)]
struct ShopBody {
    npc: String,
    item: ItemKind,
    #[serde(default = "one")]
    qty: u32,
}

#[derive(Deserialize)]
struct MarkerBody {
    marker: String,
}

#[derive(Deserialize)]
struct CommandBody {
    command: FollowerCommand,
    #[serde(default)]
    skill: Option<SkillName>,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum AdminAction {
    Heal,
    ForceEvolve,
    MaxOut,
    Reset,
}

#[derive(Deserialize)]
struct AdminBody {
    action: AdminAction,
}

fn one() -> u32 {
    1
}

/// Decodes a raw frame.
///
/// # Errors
///
/// [`NetError::Malformed`] when the text is not a frame at all.
pub fn parse_frame(raw: &str) -> NetResult<ClientFrame> {
    Ok(serde_json::from_str(raw)?)
}

/// Resolves a frame into a request.
///
/// # Errors
///
/// [`NetError::UnknownPath`] for paths outside the canonical set, and
/// [`NetError::BadBody`] when the body does not match the path's schema.
pub fn parse_request(frame: &ClientFrame) -> NetResult<Request> {
    fn body<T: serde::de::DeserializeOwned>(frame: &ClientFrame) -> NetResult<T> {
        serde_json::from_value(frame.body.clone()).map_err(|err| NetError::BadBody {
            path: frame.path.clone(),
            reason: err.to_string(),
        })
    }

    let request = match frame.path.as_str() {
        "/auth/login" => {
            let auth: AuthBody = body(frame)?;
            Request::Login { username: auth.username, pass: auth.pass }
        }
        "/auth/register" => {
            let auth: AuthBody = body(frame)?;
            Request::Register { username: auth.username, pass: auth.pass }
        }
        "/action/move" => {
            let m: MoveBody = body(frame)?;
            Request::Game(Intent::Move { x: m.x, z: m.z })
        }
        "/action/gather" => Request::Game(Intent::Gather { target: body::<TargetBody>(frame)?.target }),
        "/action/attack" => Request::Game(Intent::Attack { target: body::<TargetBody>(frame)?.target }),
        "/action/pickup" => Request::Game(Intent::Pickup { target: body::<TargetBody>(frame)?.target }),
        "/action/craft" => Request::Game(Intent::Craft { recipe: body::<RecipeBody>(frame)?.recipe }),
        "/action/equip" => Request::Game(Intent::Equip { item: body::<ItemBody>(frame)?.item }),
        "/action/unequip" => Request::Game(Intent::Unequip { slot: body::<SlotBody>(frame)?.slot }),
        "/action/eat" => Request::Game(Intent::Eat { item: body::<OptionalItemBody>(frame)?.item }),
        "/action/bury" => Request::Game(Intent::Bury),
        "/action/bank" => {
            let b: BankBody = body(frame)?;
            let op = match b.action {
                BankAction::Deposit => BankOp::Deposit { item: b.item, amount: b.amount },
                BankAction::Withdraw => BankOp::Withdraw { item: b.item, amount: b.amount },
            };
            Request::Game(Intent::Bank(op))
        }
        "/action/shop_buy" => {
            let s: ShopBody = body(frame)?;
            Request::Game(Intent::ShopBuy { npc: s.npc, item: s.item, qty: s.qty })
        }
        "/action/shop_sell" => {
            let s: ShopBody = body(frame)?;
            Request::Game(Intent::ShopSell { npc: s.npc, item: s.item, qty: s.qty })
        }
        "/action/travel" => Request::Game(Intent::Travel { marker: body::<MarkerBody>(frame)?.marker }),
        "/action/evolve" => Request::Game(Intent::Evolve),
        "/action/command" => {
            let c: CommandBody = body(frame)?;
            Request::Game(Intent::Command { command: c.command, skill: c.skill })
        }
        "/ai/tick" => Request::Game(Intent::Tick),
        "/admin/action" => {
            let a: AdminBody = body(frame)?;
            let op = match a.action {
                AdminAction::Heal => AdminOp::Heal,
                AdminAction::ForceEvolve => AdminOp::ForceEvolve,
                AdminAction::MaxOut => AdminOp::MaxOut,
                AdminAction::Reset => AdminOp::Reset,
            };
            Request::Game(Intent::Admin(op))
        }
        other => return Err(NetError::UnknownPath(other.to_string())),
    };
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(path: &str, body: serde_json::Value) -> ClientFrame {
        ClientFrame { path: path.to_string(), body }
    }

    #[test]
    fn test_login_frame() {
        let req = parse_request(&frame("/auth/login", json!({"username": "Tess", "pass": "hunter2"}))).unwrap();
        assert_eq!(req, Request::Login { username: "Tess".to_string(), pass: "hunter2".to_string() });
    }

    #[test]
    fn test_gather_frame() {
        let req = parse_request(&frame("/action/gather", json!({"target": "tree-3"}))).unwrap();
        assert_eq!(req, Request::Game(Intent::Gather { target: "tree-3".to_string() }));
    }

    #[test]
    fn test_bank_frame_defaults_amount() {
        let req = parse_request(&frame("/action/bank", json!({"action": "WITHDRAW", "item": "LOGS"}))).unwrap();
        assert_eq!(
            req,
            Request::Game(Intent::Bank(BankOp::Withdraw { item: ItemKind::Logs, amount: 1 }))
        );
    }

    #[test]
    fn test_command_frame_with_skill() {
        let req =
            parse_request(&frame("/action/command", json!({"command": "GATHER", "skill": "MINING"}))).unwrap();
        assert_eq!(
            req,
            Request::Game(Intent::Command { command: FollowerCommand::Gather, skill: Some(SkillName::Mining) })
        );
    }

    #[test]
    fn test_unknown_path_rejected() {
        let err = parse_request(&frame("/action/teleport", json!({}))).unwrap_err();
        assert!(matches!(err, NetError::UnknownPath(_)));
    }

    #[test]
    fn test_bad_body_rejected() {
        let err = parse_request(&frame("/action/move", json!({"x": "east"}))).unwrap_err();
        assert!(matches!(err, NetError::BadBody { .. }));
    }

    #[test]
    fn test_malformed_text_rejected() {
        assert!(parse_frame("not json").is_err());
    }

    #[test]
    fn test_admin_frame() {
        let req = parse_request(&frame("/admin/action", json!({"action": "MAX_OUT"}))).unwrap();
        assert_eq!(req, Request::Game(Intent::Admin(AdminOp::MaxOut)));
    }
}
