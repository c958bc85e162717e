//! Opcode metadata, parameter modes and a linear disassembler.

use std::fmt;

/// Operations understood by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Multiply,
    Input,
    Output,
    JumpIfTrue,
    JumpIfFalse,
    LessThan,
    Equals,
    AdjustRelativeBase,
    Halt,
}

impl Opcode {
    pub const ALL: [Opcode; 10] = [
        Opcode::Add,
        Opcode::Multiply,
        Opcode::Input,
        Opcode::Output,
        Opcode::JumpIfTrue,
        Opcode::JumpIfFalse,
        Opcode::LessThan,
        Opcode::Equals,
        Opcode::AdjustRelativeBase,
        Opcode::Halt,
    ];

    /// Look up an opcode by its two low decimal digits.
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            1 => Opcode::Add,
            2 => Opcode::Multiply,
            3 => Opcode::Input,
            4 => Opcode::Output,
            5 => Opcode::JumpIfTrue,
            6 => Opcode::JumpIfFalse,
            7 => Opcode::LessThan,
            8 => Opcode::Equals,
            9 => Opcode::AdjustRelativeBase,
            99 => Opcode::Halt,
            _ => return None,
        })
    }

    pub fn code(self) -> i64 {
        match self {
            Opcode::Add => 1,
            Opcode::Multiply => 2,
            Opcode::Input => 3,
            Opcode::Output => 4,
            Opcode::JumpIfTrue => 5,
            Opcode::JumpIfFalse => 6,
            Opcode::LessThan => 7,
            Opcode::Equals => 8,
            Opcode::AdjustRelativeBase => 9,
            Opcode::Halt => 99,
        }
    }

    /// Number of operand cells following the opcode cell.
    pub fn param_count(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustRelativeBase => 1,
            Opcode::Halt => 0,
        }
    }

    /// Index of the operand that names a write target, if any.
    pub fn write_param(self) -> Option<usize> {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => Some(2),
            Opcode::Input => Some(0),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Multiply => "MUL",
            Opcode::Input => "INPUT",
            Opcode::Output => "OUTPUT",
            Opcode::JumpIfTrue => "JMPIF",
            Opcode::JumpIfFalse => "JMPIFNOT",
            Opcode::LessThan => "LT",
            Opcode::Equals => "EQ",
            Opcode::AdjustRelativeBase => "ARB",
            Opcode::Halt => "HALT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamMode {
    #[default]
    Position,
    Immediate,
    Relative,
}

impl ParamMode {
    pub fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(ParamMode::Position),
            1 => Some(ParamMode::Immediate),
            2 => Some(ParamMode::Relative),
            _ => None,
        }
    }

    fn render(self, operand: i64) -> String {
        match self {
            ParamMode::Position => format!("[{operand}]"),
            ParamMode::Immediate => format!("#{operand}"),
            ParamMode::Relative if operand < 0 => format!("[rb{operand}]"),
            ParamMode::Relative => format!("[rb+{operand}]"),
        }
    }
}

/// Decoded view of one opcode cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instr {
    pub opcode: Opcode,
    modes: [ParamMode; 3],
}

impl Instr {
    /// Decode an opcode cell: the two low digits select the operation and each
    /// higher digit, least significant first, gives one operand's mode.
    ///
    /// Returns `None` for negative cells, unknown operations, and mode digits
    /// outside 0..=2 within the operation's declared operands.
    pub fn decode(value: i64) -> Option<Self> {
        if value < 0 {
            return None;
        }
        let opcode = Opcode::from_code(value % 100)?;
        let mut modes = [ParamMode::Position; 3];
        let mut digits = value / 100;
        for mode in modes.iter_mut().take(opcode.param_count()) {
            *mode = ParamMode::from_digit(digits % 10)?;
            digits /= 10;
        }
        Some(Self { opcode, modes })
    }

    pub fn mode(&self, param: usize) -> ParamMode {
        self.modes.get(param).copied().unwrap_or_default()
    }

    pub fn param_count(&self) -> usize {
        self.opcode.param_count()
    }

    /// Cells occupied by the instruction, opcode included.
    pub fn width(&self) -> usize {
        1 + self.param_count()
    }

    /// Render the instruction with its raw operand cells.
    pub fn render(&self, operands: &[i64]) -> String {
        let mut text = self.opcode.mnemonic().to_string();
        for (idx, operand) in operands.iter().take(self.param_count()).enumerate() {
            text.push_str(if idx == 0 { " " } else { ", " });
            text.push_str(&self.mode(idx).render(*operand));
        }
        text
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        let modes = &self.modes[..self.param_count()];
        if !modes.is_empty() {
            write!(f, " modes={modes:?}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasmLine {
    pub address: usize,
    pub instr: Option<Instr>,
    pub text: String,
}

impl fmt::Display for DisasmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}: {}", self.address, self.text)
    }
}

/// Walk an image front to back, decoding whatever parses as an instruction.
///
/// Cells that do not decode are emitted one at a time as `DATA`. Operands that
/// run past the end of the image read as 0, matching memory semantics.
pub fn disassemble(image: &[i64]) -> Vec<DisasmLine> {
    let mut lines = Vec::new();
    let mut address = 0;
    while address < image.len() {
        let value = image[address];
        match Instr::decode(value) {
            Some(instr) => {
                let operands: Vec<i64> = (1..instr.width())
                    .map(|offset| image.get(address + offset).copied().unwrap_or(0))
                    .collect();
                lines.push(DisasmLine {
                    address,
                    instr: Some(instr),
                    text: instr.render(&operands),
                });
                address += instr.width();
            }
            None => {
                lines.push(DisasmLine {
                    address,
                    instr: None,
                    text: format!("DATA {value}"),
                });
                address += 1;
            }
        }
    }
    lines
}
