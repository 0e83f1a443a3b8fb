//! Nested call tree in the debug-style (`callTracer`) wire schema.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Kind of call frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallKind {
    #[default]
    Call,
    StaticCall,
    DelegateCall,
    CallCode,
    Create,
    Create2,
    SelfDestruct,
}

impl CallKind {
    /// Upper-case name as emitted by geth
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::StaticCall => "STATICCALL",
            Self::DelegateCall => "DELEGATECALL",
            Self::CallCode => "CALLCODE",
            Self::Create => "CREATE",
            Self::Create2 => "CREATE2",
            Self::SelfDestruct => "SELFDESTRUCT",
        }
    }

    /// Map a frame-opening EVM opcode to its kind
    pub fn from_opcode(op: u8) -> Option<Self> {
        match op {
            0xf0 => Some(Self::Create),
            0xf1 => Some(Self::Call),
            0xf2 => Some(Self::CallCode),
            0xf4 => Some(Self::DelegateCall),
            0xf5 => Some(Self::Create2),
            0xfa => Some(Self::StaticCall),
            0xff => Some(Self::SelfDestruct),
            _ => None,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create | Self::Create2)
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "CALL" => Self::Call,
            "STATICCALL" => Self::StaticCall,
            "DELEGATECALL" => Self::DelegateCall,
            "CALLCODE" => Self::CallCode,
            "CREATE" => Self::Create,
            "CREATE2" => Self::Create2,
            "SELFDESTRUCT" => Self::SelfDestruct,
            other => return Err(format!("unknown call type: {}", other)),
        })
    }
}

impl Serialize for CallKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Accepts the geth name or the raw opcode byte the engine passes to `enter`
impl<'de> Deserialize<'de> for CallKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Opcode(u8),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
            Raw::Opcode(op) => Self::from_opcode(op).ok_or_else(|| {
                serde::de::Error::custom(format!("opcode {:#04x} does not open a frame", op))
            }),
        }
    }
}

/// One call frame of the execution tree
///
/// Field names and hex encodings follow geth's `callTracer`, so a frame
/// built locally and a frame fetched over RPC are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    #[serde(rename = "type")]
    pub kind: CallKind,

    pub from: Address,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,

    /// Gas allotted to the frame
    #[serde(default, with = "alloy_serde::quantity")]
    pub gas: u64,

    #[serde(default, with = "alloy_serde::quantity")]
    pub gas_used: u64,

    #[serde(default)]
    pub input: Bytes,

    #[serde(default, skip_serializing_if = "bytes_is_empty")]
    pub output: Bytes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wall-clock execution time, only set on the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Child frames in call order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<CallFrame>,
}

fn bytes_is_empty(bytes: &Bytes) -> bool {
    bytes.is_empty()
}

impl CallFrame {
    pub fn new(
        kind: CallKind,
        from: Address,
        to: Address,
        input: Bytes,
        gas: u64,
        value: Option<U256>,
    ) -> Self {
        Self {
            kind,
            from,
            to: Some(to),
            value,
            gas,
            gas_used: 0,
            input,
            output: Bytes::new(),
            error: None,
            time: None,
            calls: Vec::new(),
        }
    }

    /// Value moved by this frame, zero when absent
    pub fn transferred_value(&self) -> U256 {
        self.value.unwrap_or_default()
    }

    /// Number of frames in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.calls.iter().map(CallFrame::node_count).sum::<usize>()
    }

    /// Depth of the deepest frame below this one (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.calls.iter().map(CallFrame::depth).max().unwrap_or(0)
    }
}
