use std::fs;
use std::path::Path;

use idlemod_archive::error::{Error, Result};
use idlemod_archive::{transform, Action, FileWalker, GameVariant};
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31) ^ seed).collect()
}

/// `intro.bik` (1000 bytes) and `sub/level1.dat` (2048 bytes)
fn write_scenario(root: &Path) -> Result<()> {
    fs::create_dir_all(root.join("sub"))?;
    fs::write(root.join("intro.bik"), pattern(1000, 0x11))?;
    fs::write(root.join("sub").join("level1.dat"), pattern(2048, 0x5A))?;
    Ok(())
}

fn tree(root: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let walker = FileWalker::new(root);
    let files = walker
        .walk()?
        .iter()
        .map(|entry| -> Result<(String, Vec<u8>)> {
            let data = fs::read(walker.host_path(entry.path()))?;
            Ok((entry.path().to_owned(), data))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(files)
}

#[traced_test]
#[test]
fn scenario_round_trips_for_every_game() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input");
    write_scenario(&input)?;

    for game in GameVariant::ALL {
        info!("testing {}", game.title());

        let archive = dir.path().join(format!("{}.{}", game, game.container_name()));
        let output = dir.path().join(format!("{game}_output"));

        transform(Action::Pack, game.id(), &archive, &input)?;
        transform(Action::Unpack, game.id(), &archive, &output)?;

        assert_eq!(tree(&output)?, tree(&input)?);
        assert_eq!(fs::read(output.join("intro.bik"))?.len(), 1000);
        assert_eq!(fs::read(output.join("sub").join("level1.dat"))?.len(), 2048);
    }

    Ok(())
}

#[test]
fn packing_is_deterministic() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input");
    write_scenario(&input)?;
    fs::create_dir_all(input.join("empty_folder"))?;
    fs::write(input.join("a.txt"), b"")?;

    for game in GameVariant::ALL {
        let first = dir.path().join(format!("{game}.first"));
        let second = dir.path().join(format!("{game}.second"));

        transform(Action::Pack, game.id(), &first, &input)?;
        transform(Action::Pack, game.id(), &second, &input)?;

        assert_eq!(fs::read(&first)?, fs::read(&second)?, "{game}");
    }

    Ok(())
}

#[test]
fn empty_folder_round_trips() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input");
    fs::create_dir_all(&input)?;

    for game in GameVariant::ALL {
        let archive = dir.path().join(game.id());
        let output = dir.path().join(format!("{game}_output"));

        transform(Action::Pack, game.id(), &archive, &input)?;
        transform(Action::Unpack, game.id(), &archive, &output)?;

        assert!(tree(&output)?.is_empty());
    }

    Ok(())
}

#[test]
fn mhk_1_payload_is_obfuscated() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input");
    fs::create_dir_all(&input)?;
    fs::write(input.join("credits.txt"), b"Moorhuhn Kart Extra")?;

    let plain = dir.path().join("plain.dat");
    let obfuscated = dir.path().join("mhke.dat");
    transform(Action::Pack, "mhk_2", &plain, &input)?;
    transform(Action::Pack, "mhk_extra", &obfuscated, &input)?;

    let needle = b"Moorhuhn Kart Extra";
    let contains = |data: &[u8]| data.windows(needle.len()).any(|w| w == needle);
    assert!(contains(&fs::read(&plain)?));
    assert!(!contains(&fs::read(&obfuscated)?));

    Ok(())
}

#[test]
fn unpack_overwrites_existing_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input");
    write_scenario(&input)?;

    let archive = dir.path().join("data.sar");
    transform(Action::Pack, "mhk_3", &archive, &input)?;

    let output = dir.path().join("output");
    fs::create_dir_all(output.join("sub"))?;
    fs::write(output.join("intro.bik"), b"stale")?;
    fs::write(output.join("untouched.txt"), b"kept")?;

    transform(Action::Unpack, "mhk_3", &archive, &output)?;

    assert_eq!(fs::read(output.join("intro.bik"))?, pattern(1000, 0x11));
    assert_eq!(fs::read(output.join("untouched.txt"))?, b"kept");

    Ok(())
}

#[test]
fn unknown_game_touches_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input");
    write_scenario(&input)?;

    let archive = dir.path().join("archive.dat");
    let output = dir.path().join("output");

    let packed = transform(Action::Pack, "not_a_real_game", &archive, &input);
    assert!(matches!(packed, Err(Error::InvalidGameId(id)) if id == "not_a_real_game"));
    assert!(!archive.exists());

    fs::write(&archive, b"whatever")?;
    let unpacked = transform(Action::Unpack, "not_a_real_game", &archive, &output);
    assert!(matches!(unpacked, Err(Error::InvalidGameId(_))));
    assert!(!output.exists());

    Ok(())
}

#[test]
fn missing_archive_is_an_io_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let archive = dir.path().join("mhk2-00.dat");

    let err = transform(Action::Unpack, "mhk_2", &archive, dir.path()).unwrap_err();

    assert!(matches!(err.root_cause(), Error::FileError { path, .. } if *path == archive));

    Ok(())
}

#[cfg(unix)]
#[test]
fn names_unpack_would_refuse_fail_to_pack() -> Result<()> {
    let dir = tempfile::tempdir()?;

    for name in ["track:1.dat", "a\\b.txt"] {
        let input = dir.path().join("input");
        fs::create_dir_all(&input)?;
        fs::write(input.join(name), b"data")?;

        for game in GameVariant::ALL {
            let archive = dir.path().join(format!("{game}.dat"));

            let err = transform(Action::Pack, game.id(), &archive, &input).unwrap_err();

            assert!(
                matches!(err.root_cause(), Error::UnsupportedName(got) if got.ends_with(name)),
                "{game}: {err:?}"
            );
            assert!(!archive.exists());
        }

        fs::remove_dir_all(&input)?;
    }

    Ok(())
}
