//! Show/write entry points for a text front end.
//!
//! A front end (debugfs-like files, a shell, a serial console) forwards each
//! line an operator writes to one of the `write_*` methods and renders the
//! matching `show_*` method when the operator reads. Three streams exist:
//!
//! - `reg` - one-shot `r <reg> <count>` / `w <reg> <val>`; shows usage text
//! - `suspend_cfg` - `<reg> <val>` appended to the suspend list; shows the list
//! - `resume_cfg` - `<reg> <val>` appended to the resume list; shows the list
//!
//! Read results of `r` are logged, not returned through `show_reg`.

use core::fmt::Write;

use crate::inject::{
    InjectError,
    autosuspend::AutosuspendTrigger,
    command::RegCommand,
    policy::ReplayPolicy,
    storage::InjectDriver,
    types::{ListSelector, PhysicalMemory, RegisterEntry},
};

/// Help text shown when the `reg` stream is read.
pub const USAGE: &str = "
Usage: echo <CMD> <REG> <VAL> > <DEBUGFS>/inject/reg

Example 1: read one register
  echo \"r 0x3451008c 1\" > /d/inject/reg

Example 2: read multiple registers
  echo \"r 0x3451008c 10\" > /d/inject/reg

Example 3: write register
  echo \"w 0x3451008c 0x2\" > /d/inject/reg

";

/// Generates the write/show pair for one list stream.
macro_rules! impl_cfg_stream {
    ($name:ident, $selector:ident) => {
        paste::paste! {
            #[doc = "Parses `<reg> <val>` and appends it to the " $name " list."]
            #[doc = ""]
            #[doc = "Returns the number of bytes consumed, which is always `line.len()`."]
            pub fn [<write_ $name _cfg>](&self, line: &str) -> Result<usize, InjectError> {
                self.write_cfg(ListSelector::$selector, line)
            }

            #[doc = "Renders the " $name " list, one `reg val` pair per line."]
            pub fn [<show_ $name _cfg>]<W: Write>(&self, out: &mut W) -> core::fmt::Result {
                self.show_cfg(ListSelector::$selector, out)
            }
        }
    };
}

impl<'s, const N: usize, M, RP, AT> InjectDriver<'s, N, M, RP, AT>
where
    M: PhysicalMemory,
    RP: ReplayPolicy,
    AT: AutosuspendTrigger,
    bitmaps::BitsImpl<N>: bitmaps::Bits,
{
    /// Executes one `r`/`w` command line.
    ///
    /// Malformed lines are rejected before anything touches hardware. A read
    /// logs every value it produces.
    pub fn write_reg(&self, line: &str) -> Result<usize, InjectError> {
        let cmd = RegCommand::parse(line).inspect_err(|_| {
            log::warn!("reg: rejected command {:?}", line.trim_end());
        })?;
        log::info!("reg: {cmd:?}");

        match cmd {
            RegCommand::Read { register, count } => {
                for _ in self.accessor.read(register, count)? {}
            }
            RegCommand::Write { register, value } => {
                self.accessor.write(register, value)?;
            }
        }
        Ok(line.len())
    }

    /// Renders the usage text for the `reg` stream.
    pub fn show_reg<W: Write>(&self, out: &mut W) -> core::fmt::Result {
        out.write_str(USAGE)
    }

    /// Parses `<reg> <val>` and appends it to the selected list.
    pub fn write_cfg(&self, list: ListSelector, line: &str) -> Result<usize, InjectError> {
        let entry = RegisterEntry::parse(line).inspect_err(|_| {
            log::warn!("{} cfg: rejected line {:?}", list.as_str(), line.trim_end());
        })?;
        self.append(list, entry);
        Ok(line.len())
    }

    /// Renders the selected list, one `reg val` pair per line.
    pub fn show_cfg<W: Write>(&self, list: ListSelector, out: &mut W) -> core::fmt::Result {
        for entry in self.snapshot(list) {
            writeln!(out, "0x{:8x} 0x{:x}", entry.register_address, entry.value)?;
        }
        Ok(())
    }

    impl_cfg_stream!(suspend, Suspend);
    impl_cfg_stream!(resume, Resume);
}
