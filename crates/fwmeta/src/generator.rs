//! Metadata generation: hash a firmware image and publish its descriptor.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::checksum;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::metadata::{self, Metadata};
use crate::version;

/// Produces metadata files according to a [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: Config,
}

impl Generator {
    /// Create a generator using the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Hash `firmware` and write a metadata file describing it to `output`.
    ///
    /// The firmware is fully hashed before `output` is touched, so any
    /// failure to read it leaves `output` as it was.
    ///
    /// # Errors
    ///
    /// - [`Error::FirmwareRead`] if the firmware is missing or unreadable
    /// - [`Error::NotAFile`] if the firmware path is not a regular file
    /// - [`Error::InvalidFirmwareName`] if the firmware path has no file name
    /// - [`Error::MetadataWrite`] if the output cannot be written
    pub fn generate(&self, version: &str, firmware: &Path, output: &Path) -> Result<Metadata> {
        let stat = fs::metadata(firmware).map_err(|e| Error::firmware_read(firmware, e))?;
        if !stat.is_file() {
            return Err(Error::NotAFile {
                path: firmware.to_path_buf(),
            });
        }
        // Reject unusable names before spending time hashing.
        metadata::firmware_file_name(firmware)?;

        let sha256 = checksum::sha256_path(firmware)?;
        debug!(firmware = %firmware.display(), size = stat.len(), %sha256, "computed checksum");

        let record = Metadata::for_firmware(version, firmware, self.config.base_url(), sha256)?;

        warn_if_not_newer(output, &record.version);

        record.write_to(output, self.config.output.atomic_write)?;
        info!(
            path = %output.display(),
            version = %record.version,
            url = %record.url,
            "wrote firmware metadata"
        );
        Ok(record)
    }
}

/// Devices only update to a strictly greater version, so a release that
/// isn't newer than the one being replaced will never be installed.
///
/// Only regular files are read back; pipes and devices are never opened
/// for reading.
fn warn_if_not_newer(output: &Path, version: &str) {
    if !fs::metadata(output).is_ok_and(|m| m.is_file()) {
        return;
    }
    let previous = match Metadata::read_from(output) {
        Ok(previous) => previous,
        Err(e) => {
            debug!(path = %output.display(), error = %e, "ignoring unreadable previous metadata");
            return;
        }
    };

    match version::is_newer(&previous.version, version) {
        Some(true) => {}
        Some(false) if previous.version == version => {
            debug!(%version, "republishing the same version");
        }
        Some(false) => {
            warn!(
                previous = %previous.version,
                new = %version,
                "new version is not newer than the published one; devices will not update"
            );
        }
        None => {
            debug!(previous = %previous.version, new = %version, "versions are not comparable");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const HELLO_DIGEST: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            crate::logging::init_test_logging();
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn firmware(&self, name: &str, contents: &[u8]) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, contents).unwrap();
            path
        }

        fn output(&self) -> PathBuf {
            self.dir.path().join("metadata.json")
        }
    }

    #[test]
    fn test_generate_hello_scenario() {
        let fx = Fixture::new();
        let firmware = fx.firmware("fw.bin", b"hello");

        let record = Generator::default()
            .generate("1.2.3", &firmware, &fx.output())
            .unwrap();

        assert_eq!(record.version, "1.2.3");
        assert_eq!(record.url, "https://your-server.com/fw.bin");
        assert_eq!(record.sha256, HELLO_DIGEST);
        assert_eq!(Metadata::read_from(&fx.output()).unwrap(), record);
    }

    #[test]
    fn test_generate_url_ignores_directories() {
        let fx = Fixture::new();
        fs::create_dir_all(fx.dir.path().join("build/out")).unwrap();
        let firmware = fx.firmware("build/out/app.bin", b"\x00\x01\x02");

        let record = Generator::default()
            .generate("1.0.0", &firmware, &fx.output())
            .unwrap();
        assert_eq!(record.url, "https://your-server.com/app.bin");
    }

    #[test]
    fn test_generate_matches_published_vector() {
        let fx = Fixture::new();
        // FIPS 180-2 test vector: one million repetitions of 'a'.
        let firmware = fx.firmware("million-a.bin", &vec![b'a'; 1_000_000]);

        let record = Generator::default()
            .generate("2.0.0", &firmware, &fx.output())
            .unwrap();
        assert_eq!(
            record.sha256,
            "cdc76e5c9914fb9281a1c7e284d73e67f1809a48a497200e046d39ccc7112cd0"
        );
    }

    #[test]
    fn test_generate_is_idempotent() {
        let fx = Fixture::new();
        let firmware = fx.firmware("fw.bin", b"hello");
        let generator = Generator::default();

        generator.generate("1.2.3", &firmware, &fx.output()).unwrap();
        let first = fs::read(fx.output()).unwrap();
        generator.generate("1.2.3", &firmware, &fx.output()).unwrap();
        let second = fs::read(fx.output()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_missing_firmware_writes_nothing() {
        let fx = Fixture::new();
        let missing = fx.dir.path().join("missing.bin");

        let err = Generator::default()
            .generate("1.2.3", &missing, &fx.output())
            .unwrap_err();

        assert!(matches!(err, Error::FirmwareRead { .. }));
        assert!(err.is_not_found());
        assert!(!fx.output().exists());
    }

    #[test]
    fn test_generate_missing_firmware_keeps_previous_output() {
        let fx = Fixture::new();
        fs::write(fx.output(), "previous").unwrap();

        let result =
            Generator::default().generate("1.2.3", &fx.dir.path().join("nope"), &fx.output());

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(fx.output()).unwrap(), "previous");
    }

    #[test]
    fn test_generate_directory_is_not_a_file() {
        let fx = Fixture::new();
        let err = Generator::default()
            .generate("1.2.3", fx.dir.path(), &fx.output())
            .unwrap_err();

        assert!(matches!(err, Error::NotAFile { .. }));
        assert!(!fx.output().exists());
    }

    #[test]
    fn test_generate_unwritable_output() {
        let fx = Fixture::new();
        let firmware = fx.firmware("fw.bin", b"hello");
        let output = fx.dir.path().join("no-such-dir").join("metadata.json");

        let err = Generator::default()
            .generate("1.2.3", &firmware, &output)
            .unwrap_err();
        assert!(matches!(err, Error::MetadataWrite { .. }));
    }

    #[test]
    fn test_generate_with_configured_base_url() {
        let fx = Fixture::new();
        let firmware = fx.firmware("fw.bin", b"hello");
        let config = Config::default()
            .with_base_url("https://ota.example.net/esp32")
            .unwrap();

        let record = Generator::new(config)
            .generate("1.2.3", &firmware, &fx.output())
            .unwrap();
        assert_eq!(record.url, "https://ota.example.net/esp32/fw.bin");
    }

    #[test]
    fn test_generate_non_atomic_write() {
        let fx = Fixture::new();
        let firmware = fx.firmware("fw.bin", b"hello");
        let mut config = Config::default();
        config.output.atomic_write = false;

        let record = Generator::new(config)
            .generate("1.2.3", &firmware, &fx.output())
            .unwrap();
        assert_eq!(Metadata::read_from(&fx.output()).unwrap(), record);
    }

    #[test]
    fn test_generate_over_older_and_newer_metadata() {
        let fx = Fixture::new();
        let firmware = fx.firmware("fw.bin", b"hello");
        let generator = Generator::default();

        // Version regressions only warn; the file is always replaced.
        generator.generate("2.0.0", &firmware, &fx.output()).unwrap();
        generator.generate("1.0.0", &firmware, &fx.output()).unwrap();
        assert_eq!(Metadata::read_from(&fx.output()).unwrap().version, "1.0.0");

        generator.generate("1.0.1", &firmware, &fx.output()).unwrap();
        assert_eq!(Metadata::read_from(&fx.output()).unwrap().version, "1.0.1");
    }

    #[test]
    fn test_generate_over_garbage_output() {
        let fx = Fixture::new();
        let firmware = fx.firmware("fw.bin", b"hello");
        fs::write(fx.output(), "{not json").unwrap();

        let record = Generator::default()
            .generate("1.2.3", &firmware, &fx.output())
            .unwrap();
        assert_eq!(Metadata::read_from(&fx.output()).unwrap(), record);
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::{symlink, MetadataExt, PermissionsExt};
        use std::process::Command;

        fn running_as_root(fx: &Fixture) -> bool {
            let path = fx.firmware(".uid", b"");
            let uid = fs::metadata(&path).unwrap().uid();
            fs::remove_file(&path).unwrap();
            uid == 0
        }

        #[test]
        fn test_generate_unreadable_firmware_is_permission_denied() {
            let fx = Fixture::new();
            if running_as_root(&fx) {
                return;
            }
            let firmware = fx.firmware("fw.bin", b"hello");
            fs::set_permissions(&firmware, fs::Permissions::from_mode(0o000)).unwrap();

            let err = Generator::default()
                .generate("1.2.3", &firmware, &fx.output())
                .unwrap_err();

            assert!(matches!(err, Error::FirmwareRead { .. }));
            assert!(err.is_permission_denied());
            assert!(!fx.output().exists());
        }

        #[test]
        fn test_generate_read_only_output_is_permission_denied() {
            let fx = Fixture::new();
            if running_as_root(&fx) {
                return;
            }
            let firmware = fx.firmware("fw.bin", b"hello");
            fs::write(fx.output(), "old").unwrap();
            fs::set_permissions(fx.output(), fs::Permissions::from_mode(0o444)).unwrap();

            let err = Generator::default()
                .generate("1.2.3", &firmware, &fx.output())
                .unwrap_err();

            assert!(matches!(err, Error::MetadataWrite { .. }));
            assert!(err.is_permission_denied());
        }

        #[test]
        fn test_generate_into_fifo_does_not_read_it() {
            let fx = Fixture::new();
            let firmware = fx.firmware("fw.bin", b"hello");
            let fifo = fx.dir.path().join("metadata.fifo");
            assert!(Command::new("mkfifo").arg(&fifo).status().unwrap().success());

            let reader = {
                let fifo = fifo.clone();
                std::thread::spawn(move || fs::read_to_string(fifo).unwrap())
            };
            let record = Generator::default()
                .generate("1.2.3", &firmware, &fifo)
                .unwrap();

            assert_eq!(reader.join().unwrap(), record.to_json().unwrap());
        }

        #[test]
        fn test_generate_writes_through_symlink() {
            let fx = Fixture::new();
            let firmware = fx.firmware("fw.bin", b"hello");
            let real = fx.firmware("real.json", b"old");
            symlink(&real, fx.output()).unwrap();

            let record = Generator::default()
                .generate("1.2.3", &firmware, &fx.output())
                .unwrap();

            assert!(fs::symlink_metadata(fx.output())
                .unwrap()
                .file_type()
                .is_symlink());
            assert_eq!(Metadata::read_from(&real).unwrap(), record);
        }
    }
}
