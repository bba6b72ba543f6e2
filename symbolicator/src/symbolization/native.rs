// String formatting intentionally uses format! for clarity
#![allow(clippy::format_push_string)]

//! In-process resolver backend
//!
//! Answers the same two questions as `atos` and `dwarfdump --uuid`, reading the
//! debug binary with `object` and its DWARF with `addr2line`, and prints its
//! answers in the same shapes those tools do:
//!
//! ```text
//! UUID: 5A6B7C8D-1111-2222-3333-444455556666 (x86_64) /path/Foo.app.dSYM/Contents/Resources/DWARF/Foo
//! main (in Foo) (main.m:12)
//! -[AppDelegate crash] (in Foo) + 20
//! ```
//!
//! Runtime addresses are slid back to the binary's own address space with
//! `vmaddr = runtime - load_address + __TEXT.vmaddr`.

use crate::domain::ToolError;
use crate::symbolization::SymbolTools;
use addr2line::Context;
use anyhow::{anyhow, Context as _, Result};
use gimli::{EndianRcSlice, RunTimeEndian};
use object::read::macho::{FatArch, MachOFatFile32, MachOFatFile64};
use object::{
    Architecture, BinaryFormat, FileKind, Object, ObjectSection, ObjectSegment, SymbolMap,
    SymbolMapName,
};
use rustc_demangle::demangle;
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// Resolver backend that needs no external tools
#[derive(Debug, Clone, Default)]
pub struct NativeTools {
    arch: Option<String>,
}

impl NativeTools {
    /// `arch` selects the slice of a universal binary (`x86_64`, `arm64`, ...)
    #[must_use]
    pub fn new(arch: Option<String>) -> Self {
        Self { arch }
    }
}

impl SymbolTools for NativeTools {
    async fn symbolicate(
        &self,
        binary: &Path,
        load_address: &str,
        addresses: &[String],
    ) -> Result<String, ToolError> {
        let binary = binary.to_path_buf();
        let load_address = load_address.to_string();
        let addresses = addresses.to_vec();
        let arch = self.arch.clone();
        run_blocking(move || {
            symbolicate_file(&binary, &load_address, &addresses, arch.as_deref())
        })
        .await
    }

    async fn extract_uuid(&self, binary: &Path) -> Result<String, ToolError> {
        let binary = binary.to_path_buf();
        run_blocking(move || describe_uuids(&binary)).await
    }
}

async fn run_blocking<F>(work: F) -> Result<String, ToolError>
where
    F: FnOnce() -> Result<String> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ToolError::Native(e.to_string()))?
        .map_err(|e| ToolError::Native(format!("{e:#}")))
}

/// `dwarfdump --uuid` equivalent: one line per architecture slice
///
/// # Errors
/// Returns an error if the file cannot be read or is not an object file
pub fn describe_uuids(path: &Path) -> Result<String> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut output = String::new();
    for slice in slices(&data)? {
        let file = object::File::parse(slice).context("Failed to parse object file")?;
        if let Some(id) = image_identifier(&file)? {
            output.push_str(&format!(
                "UUID: {id} ({}) {}\n",
                arch_name(file.architecture()),
                path.display()
            ));
        }
    }
    Ok(output)
}

/// `atos -o <path> -l <load> <addr>...` equivalent
///
/// Unresolvable addresses are echoed back, as `atos` does, so the output keeps
/// one line per input address.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or the load address is not hex
pub fn symbolicate_file(
    path: &Path,
    load_address: &str,
    addresses: &[String],
    arch: Option<&str>,
) -> Result<String> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let slice = select_slice(&data, arch)?;
    let file = object::File::parse(slice).context("Failed to parse object file")?;
    let load = parse_hex(load_address)
        .ok_or_else(|| anyhow!("Invalid load address {load_address}"))?;

    let symbolizer = Symbolizer::new(&file, image_name(path))?;
    let base = text_base(&file);

    let mut output = String::new();
    for raw in addresses {
        let line = parse_hex(raw)
            .and_then(|addr| addr.checked_sub(load))
            .and_then(|offset| offset.checked_add(base))
            .and_then(|vmaddr| symbolizer.describe(vmaddr))
            .unwrap_or_else(|| raw.clone());
        output.push_str(&line);
        output.push('\n');
    }
    Ok(output)
}

/// DWARF and symbol-table lookups for one architecture slice
struct Symbolizer<'d> {
    ctx: Option<Context<EndianRcSlice<RunTimeEndian>>>,
    symbols: SymbolMap<SymbolMapName<'d>>,
    is_macho: bool,
    image: String,
}

impl<'d> Symbolizer<'d> {
    fn new(file: &object::File<'d>, image: String) -> Result<Self> {
        // Load DWARF debug info
        let endian =
            if file.is_little_endian() { RunTimeEndian::Little } else { RunTimeEndian::Big };

        let load_section =
            |id: gimli::SectionId| -> Result<EndianRcSlice<RunTimeEndian>, gimli::Error> {
                let data = file
                    .section_by_name(id.name())
                    .and_then(|section| section.uncompressed_data().ok())
                    .unwrap_or(std::borrow::Cow::Borrowed(&[][..]));
                Ok(EndianRcSlice::new(Rc::from(&*data), endian))
            };

        let dwarf = gimli::Dwarf::load(&load_section)?;
        // A binary without DWARF still has a symbol table worth using
        let ctx = Context::from_dwarf(dwarf).ok();

        Ok(Self {
            ctx,
            symbols: file.symbol_map(),
            is_macho: file.format() == BinaryFormat::MachO,
            image,
        })
    }

    /// `function (in image) (file:line)`, or `function (in image) + offset`
    fn describe(&self, vmaddr: u64) -> Option<String> {
        if let Some(frame) = self.innermost_frame(vmaddr) {
            return Some(frame);
        }
        let symbol = self.symbols.get(vmaddr)?;
        let name = symbol.name();
        // Mach-O prefixes every C symbol with an underscore
        let name = if self.is_macho { name.strip_prefix('_').unwrap_or(name) } else { name };
        Some(format!(
            "{} (in {}) + {}",
            Self::demangle_symbol(name),
            self.image,
            vmaddr - symbol.address()
        ))
    }

    fn innermost_frame(&self, vmaddr: u64) -> Option<String> {
        let ctx = self.ctx.as_ref()?;
        let mut frames = ctx.find_frames(vmaddr).skip_all_loads().ok()?;
        let frame = frames.next().ok()??;

        let function = frame.function.and_then(|f| f.demangle().ok().map(|s| s.to_string()))?;
        let mut text = format!("{function} (in {})", self.image);
        if let Some(loc) = frame.location {
            if let (Some(file), Some(line)) = (loc.file, loc.line) {
                let file = Path::new(file).file_name().map_or_else(
                    || file.to_string(),
                    |name| name.to_string_lossy().into_owned(),
                );
                text.push_str(&format!(" ({file}:{line})"));
            }
        }
        Some(text)
    }

    /// Demangle a Rust symbol name
    #[must_use]
    fn demangle_symbol(symbol: &str) -> String {
        format!("{:#}", demangle(symbol))
    }
}

/// Every architecture slice of a (possibly universal) Mach-O file
fn slices(data: &[u8]) -> Result<Vec<&[u8]>> {
    match FileKind::parse(data).context("Unrecognized file format")? {
        FileKind::MachOFat32 => {
            let fat = MachOFatFile32::parse(data).context("Failed to parse universal binary")?;
            fat.arches()
                .iter()
                .map(|arch| arch.data(data).context("Failed to read architecture slice"))
                .collect()
        }
        FileKind::MachOFat64 => {
            let fat = MachOFatFile64::parse(data).context("Failed to parse universal binary")?;
            fat.arches()
                .iter()
                .map(|arch| arch.data(data).context("Failed to read architecture slice"))
                .collect()
        }
        _ => Ok(vec![data]),
    }
}

/// The slice named by `arch`, or the first one
fn select_slice<'d>(data: &'d [u8], arch: Option<&str>) -> Result<&'d [u8]> {
    let slices = slices(data)?;
    let Some(wanted) = arch else {
        return slices.first().copied().ok_or_else(|| anyhow!("Universal binary has no slices"));
    };
    for slice in slices {
        let file = object::File::parse(slice).context("Failed to parse object file")?;
        if arch_name(file.architecture()) == wanted {
            return Ok(slice);
        }
    }
    Err(anyhow!("No {wanted} slice in binary"))
}

/// Mach-O `LC_UUID` formatted like dwarfdump, or the ELF build id in hex
fn image_identifier(file: &object::File<'_>) -> Result<Option<String>> {
    if let Some(uuid) = file.mach_uuid().context("Failed to read LC_UUID")? {
        return Ok(Some(format_uuid(&uuid)));
    }
    let build_id = file.build_id().context("Failed to read build id")?;
    Ok(build_id.map(|id| id.iter().map(|b| format!("{b:02X}")).collect()))
}

fn format_uuid(bytes: &[u8; 16]) -> String {
    let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
    format!("{}-{}-{}-{}-{}", &hex[0..8], &hex[8..12], &hex[12..16], &hex[16..20], &hex[20..32])
}

/// Preferred address of `__TEXT`, the base atos slides addresses against
fn text_base(file: &object::File<'_>) -> u64 {
    file.segments()
        .find(|segment| matches!(segment.name(), Ok(Some("__TEXT"))))
        .map_or_else(|| file.relative_address_base(), |segment| segment.address())
}

fn image_name(path: &Path) -> String {
    path.file_name().map_or_else(String::new, |name| name.to_string_lossy().into_owned())
}

fn arch_name(arch: Architecture) -> &'static str {
    match arch {
        Architecture::X86_64 => "x86_64",
        Architecture::Aarch64 => "arm64",
        Architecture::I386 => "i386",
        Architecture::Arm => "armv7",
        _ => "unknown",
    }
}

fn parse_hex(text: &str) -> Option<u64> {
    let digits = text.trim().trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(digits, 16).ok()
}
