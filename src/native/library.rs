//! Loading the simulation library from disk.

use std::path::{Path, PathBuf};

use libloading::Library;
use log::{debug, info};

use crate::native::abi::{
    AddFn, DoCoolStuffFn, SYM_ADD, SYM_DO_COOL_STUFF, SYM_TEST, SYM_TEST2, Symbols, Test2Fn,
    TestFn,
};
use crate::native::engine::NativeCallError;

/// Logical name of the simulation library, relative to the working directory.
pub const DEFAULT_LIBRARY: &str = "native/logik_simulation";

/// Turn a logical library name into a platform file name.
///
/// `native/logik_simulation` becomes `native/liblogik_simulation.so` on Linux,
/// `native/logik_simulation.dll` on Windows. Names that already carry an
/// extension are taken as literal paths.
pub fn resolve_library_path(name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.extension().is_some() {
        return path.to_path_buf();
    }
    match path.file_name() {
        Some(stem) => path.with_file_name(libloading::library_filename(stem)),
        None => path.to_path_buf(),
    }
}

/// A loaded library with every boundary symbol resolved.
pub struct NativeLibrary {
    symbols: Symbols,
    path: PathBuf,
    // Keeps the code behind `symbols` mapped.
    _library: Library,
}

impl NativeLibrary {
    /// Load `path` and resolve all four symbols. Fails on the first missing one.
    pub fn load(path: &Path) -> Result<Self, NativeCallError> {
        info!("Loading simulation library {}", path.display());
        // SAFETY: loading runs the library's initialisers. The library is
        // trusted as part of the installation.
        let library = unsafe { Library::new(path) }.map_err(|e| NativeCallError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // SAFETY: each symbol is declared with the signature the library
        // exports. The copied fn pointers stay valid while `library` lives,
        // and it lives as long as `Self`.
        let symbols = unsafe {
            Symbols {
                test: *resolve::<TestFn>(&library, SYM_TEST)?,
                test2: *resolve::<Test2Fn>(&library, SYM_TEST2)?,
                add: *resolve::<AddFn>(&library, SYM_ADD)?,
                do_cool_stuff: *resolve::<DoCoolStuffFn>(&library, SYM_DO_COOL_STUFF)?,
            }
        };
        Ok(Self {
            symbols,
            path: path.to_path_buf(),
            _library: library,
        })
    }

    pub fn symbols(&self) -> Symbols {
        self.symbols
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

unsafe fn resolve<'lib, T>(
    library: &'lib Library,
    name: &[u8],
) -> Result<libloading::Symbol<'lib, T>, NativeCallError> {
    let symbol = String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name)).into_owned();
    // SAFETY: forwarded from the caller, who picks `T` to match the export.
    let found = unsafe { library.get::<T>(name) }.map_err(|e| NativeCallError::MissingSymbol {
        symbol: symbol.clone(),
        reason: e.to_string(),
    })?;
    debug!("Resolved symbol {symbol}");
    Ok(found)
}
