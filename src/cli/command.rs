//! Command parsing.
//!
//! Parsing runs in a fixed order: command name, arity, then typed
//! parameters. Every failure here happens before any collaborator is built.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, U256};

use crate::config::Chain;
use crate::error::{FunctionsError, FunctionsResult};
use crate::secrets::bundle::parse_keys;

/// Raw command line after global options: a command name and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Option<String>,
    pub params: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let command = args.next();
        Self {
            command,
            params: args.collect(),
        }
    }
}

/// Recognized command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Read,
    Create,
    Cancel,
    Fund,
    AddConsumer,
    RemoveConsumer,
    Encrypt,
    EncryptUpload,
    EncryptGist,
    EncryptUrls,
    Networks,
}

impl CommandKind {
    pub const ALL: [CommandKind; 11] = [
        CommandKind::Read,
        CommandKind::Create,
        CommandKind::Cancel,
        CommandKind::Fund,
        CommandKind::AddConsumer,
        CommandKind::RemoveConsumer,
        CommandKind::Encrypt,
        CommandKind::EncryptUpload,
        CommandKind::EncryptGist,
        CommandKind::EncryptUrls,
        CommandKind::Networks,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Read => "read",
            CommandKind::Create => "create",
            CommandKind::Cancel => "cancel",
            CommandKind::Fund => "fund",
            CommandKind::AddConsumer => "add-consumer",
            CommandKind::RemoveConsumer => "remove-consumer",
            CommandKind::Encrypt => "encrypt",
            CommandKind::EncryptUpload => "encrypt-upload",
            CommandKind::EncryptGist => "encrypt-gist",
            CommandKind::EncryptUrls => "encrypt-urls",
            CommandKind::Networks => "networks",
        }
    }

    /// Minimum number of positional parameters after the command name.
    pub fn min_args(&self) -> usize {
        match self {
            CommandKind::Networks => 0,
            CommandKind::Create => 1,
            CommandKind::Read
            | CommandKind::Cancel
            | CommandKind::Encrypt
            | CommandKind::EncryptGist
            | CommandKind::EncryptUrls => 2,
            CommandKind::Fund | CommandKind::AddConsumer | CommandKind::RemoveConsumer => 3,
            CommandKind::EncryptUpload => 4,
        }
    }

    /// Parameter synopsis for usage output.
    pub fn usage(&self) -> &'static str {
        match self {
            CommandKind::Read => "<chain> <subscriptionId>",
            CommandKind::Create => "<chain> [consumerAddress]",
            CommandKind::Cancel => "<chain> <subscriptionId> [refundAddress]",
            CommandKind::Fund => "<chain> <subscriptionId> <juelsAmount>",
            CommandKind::AddConsumer | CommandKind::RemoveConsumer => {
                "<chain> <subscriptionId> <consumerAddress>"
            }
            CommandKind::Encrypt | CommandKind::EncryptGist => "<chain> <KEY1,KEY2,...>",
            CommandKind::EncryptUpload => {
                "<chain> <KEY1,KEY2,...> <slotId> <expirationMinutes>"
            }
            CommandKind::EncryptUrls => "<chain> <url1,url2,...>",
            CommandKind::Networks => "",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommandKind {
    type Err = FunctionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| FunctionsError::UnknownCommand(s.to_string()))
    }
}

/// Fail when fewer than `expected` parameters were supplied.
pub fn validate_argument_count(expected: usize, actual: usize) -> FunctionsResult<()> {
    if actual < expected {
        return Err(FunctionsError::InsufficientArguments { expected, actual });
    }
    Ok(())
}

/// A fully parsed command, one variant per handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Read {
        chain: Chain,
        subscription_id: u64,
    },
    Create {
        chain: Chain,
        consumer: Option<Address>,
    },
    Cancel {
        chain: Chain,
        subscription_id: u64,
        refund_address: Option<Address>,
    },
    Fund {
        chain: Chain,
        subscription_id: u64,
        juels: U256,
    },
    AddConsumer {
        chain: Chain,
        subscription_id: u64,
        consumer: Address,
    },
    RemoveConsumer {
        chain: Chain,
        subscription_id: u64,
        consumer: Address,
    },
    Encrypt {
        chain: Chain,
        keys: Vec<String>,
    },
    EncryptUpload {
        chain: Chain,
        keys: Vec<String>,
        slot_id: u32,
        minutes_until_expiration: u64,
    },
    EncryptGist {
        chain: Chain,
        keys: Vec<String>,
    },
    EncryptUrls {
        chain: Chain,
        urls: Vec<String>,
    },
    Networks,
}

fn invalid(name: &'static str, value: &str, reason: impl fmt::Display) -> FunctionsError {
    FunctionsError::InvalidArgument {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_subscription_id(value: &str) -> FunctionsResult<u64> {
    value
        .parse()
        .map_err(|e| invalid("subscription id", value, e))
}

fn parse_address(name: &'static str, value: &str) -> FunctionsResult<Address> {
    Address::from_str(value).map_err(|e| invalid(name, value, e))
}

fn parse_juels(value: &str) -> FunctionsResult<U256> {
    let juels = U256::from_str_radix(value, 10).map_err(|e| invalid("juels amount", value, e))?;
    if juels.is_zero() {
        return Err(invalid("juels amount", value, "must be greater than zero"));
    }
    Ok(juels)
}

fn parse_list(name: &'static str, value: &str) -> FunctionsResult<Vec<String>> {
    let items = parse_keys(value);
    if items.iter().any(String::is_empty) {
        return Err(invalid(name, value, "contains an empty entry"));
    }
    Ok(items)
}

impl Command {
    /// Parse an invocation into a typed command.
    pub fn parse(invocation: Invocation) -> FunctionsResult<Self> {
        let name = invocation.command.ok_or(FunctionsError::InsufficientArguments {
            expected: 1,
            actual: 0,
        })?;
        let kind = CommandKind::from_str(&name)?;
        let params = invocation.params;
        validate_argument_count(kind.min_args(), params.len())?;

        if kind == CommandKind::Networks {
            return Ok(Command::Networks);
        }

        let chain = Chain::from_str(&params[0])?;
        let optional = |i: usize| params.get(i).map(String::as_str);

        let command = match kind {
            CommandKind::Read => Command::Read {
                chain,
                subscription_id: parse_subscription_id(&params[1])?,
            },
            CommandKind::Create => Command::Create {
                chain,
                consumer: optional(1)
                    .map(|v| parse_address("consumer address", v))
                    .transpose()?,
            },
            CommandKind::Cancel => Command::Cancel {
                chain,
                subscription_id: parse_subscription_id(&params[1])?,
                refund_address: optional(2)
                    .map(|v| parse_address("refund address", v))
                    .transpose()?,
            },
            CommandKind::Fund => Command::Fund {
                chain,
                subscription_id: parse_subscription_id(&params[1])?,
                juels: parse_juels(&params[2])?,
            },
            CommandKind::AddConsumer => Command::AddConsumer {
                chain,
                subscription_id: parse_subscription_id(&params[1])?,
                consumer: parse_address("consumer address", &params[2])?,
            },
            CommandKind::RemoveConsumer => Command::RemoveConsumer {
                chain,
                subscription_id: parse_subscription_id(&params[1])?,
                consumer: parse_address("consumer address", &params[2])?,
            },
            CommandKind::Encrypt => Command::Encrypt {
                chain,
                keys: parse_list("secret keys", &params[1])?,
            },
            CommandKind::EncryptUpload => Command::EncryptUpload {
                chain,
                keys: parse_list("secret keys", &params[1])?,
                slot_id: params[2]
                    .parse()
                    .map_err(|e| invalid("slot id", &params[2], e))?,
                minutes_until_expiration: params[3]
                    .parse()
                    .map_err(|e| invalid("expiration minutes", &params[3], e))?,
            },
            CommandKind::EncryptGist => Command::EncryptGist {
                chain,
                keys: parse_list("secret keys", &params[1])?,
            },
            CommandKind::EncryptUrls => Command::EncryptUrls {
                chain,
                urls: parse_list("secrets urls", &params[1])?,
            },
            CommandKind::Networks => Command::Networks,
        };
        Ok(command)
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Read { .. } => CommandKind::Read,
            Command::Create { .. } => CommandKind::Create,
            Command::Cancel { .. } => CommandKind::Cancel,
            Command::Fund { .. } => CommandKind::Fund,
            Command::AddConsumer { .. } => CommandKind::AddConsumer,
            Command::RemoveConsumer { .. } => CommandKind::RemoveConsumer,
            Command::Encrypt { .. } => CommandKind::Encrypt,
            Command::EncryptUpload { .. } => CommandKind::EncryptUpload,
            Command::EncryptGist { .. } => CommandKind::EncryptGist,
            Command::EncryptUrls { .. } => CommandKind::EncryptUrls,
            Command::Networks => CommandKind::Networks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> FunctionsResult<Command> {
        Command::parse(Invocation::new(args.iter().copied()))
    }

    #[test]
    fn test_every_kind_round_trips_by_name() {
        for kind in CommandKind::ALL {
            assert_eq!(kind.name().parse::<CommandKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_arity_counts_params_after_command() {
        match parse(&["fund", "polygonMumbai", "1"]) {
            Err(FunctionsError::InsufficientArguments { expected, actual }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_empty_invocation() {
        assert!(matches!(
            parse(&[]),
            Err(FunctionsError::InsufficientArguments {
                expected: 1,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_arity_checked_before_chain() {
        assert!(matches!(
            parse(&["read", "notAChain"]),
            Err(FunctionsError::InsufficientArguments { .. })
        ));
        assert!(matches!(
            parse(&["read", "notAChain", "1"]),
            Err(FunctionsError::UnsupportedChain(_))
        ));
    }

    #[test]
    fn test_create_without_consumer() {
        assert_eq!(
            parse(&["create", "polygonMumbai"]).unwrap(),
            Command::Create {
                chain: Chain::PolygonMumbai,
                consumer: None
            }
        );
    }

    #[test]
    fn test_cancel_with_refund() {
        let cmd = parse(&[
            "cancel",
            "ethereumSepolia",
            "42",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        ])
        .unwrap();
        match cmd {
            Command::Cancel {
                subscription_id,
                refund_address,
                ..
            } => {
                assert_eq!(subscription_id, 42);
                assert!(refund_address.is_some());
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_fund_parses_large_amount() {
        let cmd = parse(&["fund", "polygonMumbai", "7", "100000000000000000000"]).unwrap();
        assert_eq!(
            cmd,
            Command::Fund {
                chain: Chain::PolygonMumbai,
                subscription_id: 7,
                juels: U256::from(100_000_000_000_000_000_000u128),
            }
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            parse(&["read", "polygonMumbai", "abc"]),
            Err(FunctionsError::InvalidArgument { name: "subscription id", .. })
        ));
        assert!(matches!(
            parse(&["fund", "polygonMumbai", "1", "0"]),
            Err(FunctionsError::InvalidArgument { name: "juels amount", .. })
        ));
        assert!(matches!(
            parse(&["add-consumer", "polygonMumbai", "1", "0x1234"]),
            Err(FunctionsError::InvalidArgument { name: "consumer address", .. })
        ));
        assert!(matches!(
            parse(&["encrypt", "polygonMumbai", "A,,B"]),
            Err(FunctionsError::InvalidArgument { name: "secret keys", .. })
        ));
    }

    #[test]
    fn test_encrypt_upload() {
        let cmd = parse(&["encrypt-upload", "polygonAmoy", "A, B", "0", "15"]).unwrap();
        assert_eq!(
            cmd,
            Command::EncryptUpload {
                chain: Chain::PolygonAmoy,
                keys: vec!["A".to_string(), "B".to_string()],
                slot_id: 0,
                minutes_until_expiration: 15,
            }
        );
        assert_eq!(cmd.kind(), CommandKind::EncryptUpload);
    }

    #[test]
    fn test_networks_takes_no_params() {
        assert_eq!(parse(&["networks"]).unwrap(), Command::Networks);
    }
}
