#![cfg(test)]
#![allow(clippy::undocumented_unsafe_blocks)]

use std::collections::BTreeSet;
use std::ffi::{CStr, CString, c_char};
use std::ptr::{self, NonNull};

use tempfile::TempDir;

use super::*;
use crate::fs::{Directory, File};

const READ_WRITE: u32 = 2;
const CREATE_ALWAYS: u32 = 2;
const OPEN_EXISTING: u32 = 3;
const NO_FLAGS: u32 = 0;
const SEEK_SET: u32 = 0;
const MAP_READ_ONLY: u32 = 0;

fn c_path(dir: &TempDir, name: &str) -> CString {
    let path = dir.path().join(name);
    CString::new(path.to_str().expect("utf-8 temp path")).expect("no interior nul")
}

fn last_error() -> Option<String> {
    let length = pfs_last_error_length();
    if length == 0 {
        return None;
    }
    let mut buffer = vec![0_u8; length as usize];
    let written =
        unsafe { pfs_last_error_message(NonNull::new(buffer.as_mut_ptr().cast::<c_char>()), length) };
    assert_eq!(written, length, "The whole message should be copied.");
    let message = CStr::from_bytes_with_nul(&buffer).expect("terminated message");
    Some(message.to_str().expect("utf-8 message").to_owned())
}

fn drain(directory: &mut Directory) -> Vec<String> {
    let mut names = Vec::new();
    loop {
        let name = pfs_directory_next(Some(&mut *directory));
        if name.is_null() {
            return names;
        }
        let name = unsafe { CStr::from_ptr(name) };
        names.push(name.to_str().expect("utf-8 name").to_owned());
    }
}

fn create(path: &CStr) -> Box<File> {
    unsafe { pfs_file_open(path.as_ptr(), READ_WRITE, CREATE_ALWAYS, NO_FLAGS) }
        .expect("open should succeed")
}

fn write(file: &File, data: &[u8]) -> i64 {
    unsafe { pfs_file_write(Some(file), data.as_ptr().cast(), 0, data.len()) }
}

#[test]
fn test_file_lifecycle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = c_path(&dir, "lifecycle.bin");

    let file = create(&path);
    assert_eq!(write(&file, b"0123456789"), 10);
    assert_eq!(pfs_file_get_size(Some(&*file)), 10);
    assert_eq!(pfs_file_tell(Some(&*file)), 10);

    pfs_file_seek(Some(&*file), 2, SEEK_SET);
    assert_eq!(pfs_file_tell(Some(&*file)), 2);

    let mut buffer = [0_u8; 8];
    let read = unsafe { pfs_file_read(Some(&*file), buffer.as_mut_ptr().cast(), 4, 4) };
    assert_eq!(read, 4);
    assert_eq!(&buffer, b"\0\0\0\02345", "The buffer offset should be honoured.");

    assert!(pfs_file_truncate(Some(&*file), 3));
    assert_eq!(pfs_file_get_size(Some(&*file)), 3);
    assert_eq!(pfs_file_tell(Some(&*file)), 6, "Truncating shouldn't move the cursor.");

    pfs_file_close(Some(file));
    assert!(unsafe { pfs_file_delete(path.as_ptr()) });
    assert!(unsafe { pfs_file_open(path.as_ptr(), READ_WRITE, OPEN_EXISTING, NO_FLAGS) }.is_none());
}

#[test]
fn test_positioned_io() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = create(&c_path(&dir, "positioned.bin"));
    write(&file, b"abc");

    let data = b"0123456789";
    let written = unsafe {
        pfs_file_write_at_offset(Some(&*file), data.as_ptr().cast(), 0, data.len(), 100)
    };
    assert_eq!(written, 10);
    assert_eq!(pfs_file_tell(Some(&*file)), 3, "Positioned writes shouldn't move the cursor.");

    let mut buffer = [0_u8; 10];
    let read = unsafe {
        pfs_file_read_at_offset(Some(&*file), buffer.as_mut_ptr().cast(), 0, buffer.len(), 100)
    };
    assert_eq!(read, 10);
    assert_eq!(&buffer, data);
    let past_end = unsafe {
        pfs_file_read_at_offset(Some(&*file), buffer.as_mut_ptr().cast(), 0, buffer.len(), 4096)
    };
    assert_eq!(past_end, 0, "Reading past the end should return 0, not fail.");
    assert_eq!(pfs_file_tell(Some(&*file)), 3);

    pfs_file_close(Some(file));
}

#[test]
fn test_memory_map() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut file = create(&c_path(&dir, "mapped.bin"));

    assert!(
        pfs_file_memory_map(Some(&mut *file), MAP_READ_ONLY).is_null(),
        "An empty file can't be mapped."
    );
    assert!(last_error().is_some());

    write(&file, b"mapped");
    let first = pfs_file_memory_map(Some(&mut *file), MAP_READ_ONLY);
    let second = pfs_file_memory_map(Some(&mut *file), MAP_READ_ONLY);
    assert!(!first.is_null());
    assert_eq!(first, second);

    pfs_file_memory_unmap(Some(&mut *file));
    let bytes = unsafe { std::slice::from_raw_parts(first.cast::<u8>(), 6) };
    assert_eq!(bytes, b"mapped", "One unmap shouldn't release a twice-mapped file.");

    // Closing with an outstanding reference releases the mapping too.
    pfs_file_close(Some(file));
}

#[test]
fn test_invalid_codes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = c_path(&dir, "codes.bin");

    assert!(unsafe { pfs_file_open(path.as_ptr(), 3, CREATE_ALWAYS, NO_FLAGS) }.is_none());
    assert!(last_error().is_some_and(|message| message.contains("open mode")));
    assert!(unsafe { pfs_file_open(path.as_ptr(), READ_WRITE, 0, NO_FLAGS) }.is_none());
    assert!(unsafe { pfs_file_open(path.as_ptr(), READ_WRITE, CREATE_ALWAYS, 1 << 5) }.is_none());

    let mut file = create(&path);
    write(&file, b"abcdef");
    pfs_file_seek(Some(&*file), 1, 9);
    assert_eq!(pfs_file_tell(Some(&*file)), 6, "An unknown seek mode should leave the cursor alone.");
    assert!(last_error().is_some_and(|message| message.contains("seek mode")));

    assert!(pfs_file_memory_map(Some(&mut *file), 7).is_null());
    pfs_file_close(Some(file));
}

#[test]
fn test_oversized_position_is_recorded() {
    update_last_error("stale");
    assert_eq!(file::position(Ok(u64::MAX), "pfs_file_tell"), FAILURE);
    assert!(
        last_error().is_some_and(|message| message.contains("signed 64-bit")),
        "An unrepresentable position should replace the last error."
    );

    assert_eq!(file::position(Ok(42), "pfs_file_tell"), 42);
    assert_eq!(last_error(), None, "Success shouldn't record anything.");
}

#[test]
fn test_null_handles() {
    assert_eq!(pfs_file_get_size(None), FAILURE);
    assert_eq!(pfs_file_tell(None), FAILURE);
    assert!(!pfs_file_truncate(None, 0));
    assert_eq!(unsafe { pfs_file_read(None, ptr::null_mut(), 0, 0) }, FAILURE);
    assert_eq!(unsafe { pfs_file_write(None, ptr::null(), 0, 0) }, FAILURE);
    assert_eq!(unsafe { pfs_file_read_at_offset(None, ptr::null_mut(), 0, 0, 0) }, FAILURE);
    assert_eq!(unsafe { pfs_file_write_at_offset(None, ptr::null(), 0, 0, 0) }, FAILURE);
    assert!(pfs_file_memory_map(None, MAP_READ_ONLY).is_null());
    pfs_file_memory_unmap(None);
    pfs_file_seek(None, 0, SEEK_SET);
    pfs_file_close(None);

    assert!(pfs_directory_next(None).is_null());
    assert!(!pfs_directory_rewind(None));
    pfs_directory_close(None);

    assert!(last_error().is_some_and(|message| message.contains("null")));
    assert_eq!(last_error(), None, "Reading the message should clear it.");
}

#[test]
fn test_null_paths_and_buffers() {
    assert!(unsafe { pfs_file_open(ptr::null(), READ_WRITE, CREATE_ALWAYS, NO_FLAGS) }.is_none());
    assert!(unsafe { !pfs_file_delete(ptr::null()) });
    assert!(unsafe { !pfs_file_truncate_path(ptr::null(), 0) });
    assert!(unsafe { pfs_directory_open(ptr::null()) }.is_none());
    assert!(unsafe { !pfs_directory_create(ptr::null()) });
    assert!(unsafe { !pfs_directory_remove_empty(ptr::null()) });

    let dir = tempfile::tempdir().expect("temp dir");
    let file = create(&c_path(&dir, "buffers.bin"));
    assert_eq!(unsafe { pfs_file_write(Some(&*file), ptr::null(), 0, 0) }, 0);
    assert_eq!(unsafe { pfs_file_write(Some(&*file), ptr::null(), 0, 4) }, FAILURE);
    assert_eq!(unsafe { pfs_file_read(Some(&*file), ptr::null_mut(), 0, 4) }, FAILURE);
    pfs_file_close(Some(file));
}

#[test]
fn test_truncate_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = c_path(&dir, "sized.bin");
    pfs_file_close(Some(create(&path)));

    assert!(unsafe { pfs_file_truncate_path(path.as_ptr(), 1024) });
    let file = unsafe { pfs_file_open(path.as_ptr(), READ_WRITE, OPEN_EXISTING, NO_FLAGS) }
        .expect("reopen");
    assert_eq!(pfs_file_get_size(Some(&*file)), 1024);
    pfs_file_close(Some(file));
}

#[test]
fn test_directory_lifecycle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let sub = c_path(&dir, "listing");
    assert!(unsafe { pfs_directory_create(sub.as_ptr()) });
    assert!(unsafe { !pfs_directory_create(sub.as_ptr()) }, "The directory already exists.");

    let sub_dir = dir.path().join("listing");
    for name in ["a.txt", "b.txt"] {
        let path = CString::new(sub_dir.join(name).to_str().expect("utf-8 temp path"))
            .expect("no interior nul");
        pfs_file_close(Some(create(&path)));
    }

    let mut directory =
        unsafe { pfs_directory_open(sub.as_ptr()) }.expect("open should succeed");

    let first_pass = drain(&mut directory);
    assert!(pfs_directory_next(Some(&mut *directory)).is_null(), "The end should be sticky.");
    let children: BTreeSet<&str> = first_pass
        .iter()
        .map(String::as_str)
        .filter(|name| *name != "." && *name != "..")
        .collect();
    assert_eq!(children, BTreeSet::from(["a.txt", "b.txt"]));

    assert!(pfs_directory_rewind(Some(&mut *directory)));
    let second_pass = drain(&mut directory);
    assert_eq!(second_pass.first(), first_pass.first(), "Rewind should restart at the first entry.");
    pfs_directory_close(Some(directory));

    assert!(unsafe { !pfs_directory_remove_empty(sub.as_ptr()) }, "The directory isn't empty.");
    for name in ["a.txt", "b.txt"] {
        let path = CString::new(sub_dir.join(name).to_str().expect("utf-8 temp path"))
            .expect("no interior nul");
        assert!(unsafe { pfs_file_delete(path.as_ptr()) });
    }
    assert!(unsafe { pfs_directory_remove_empty(sub.as_ptr()) });
}

#[test]
fn test_last_error_message_buffer() {
    update_last_error("short");

    let mut small = [0 as c_char; 3];
    assert_eq!(unsafe { pfs_last_error_message(NonNull::new(small.as_mut_ptr()), 3) }, -1);
    assert_eq!(pfs_last_error_length(), 0, "A non-null buffer clears the error even when too small.");

    update_last_error("short");
    assert_eq!(unsafe { pfs_last_error_message(None, 64) }, -1);
    assert_eq!(pfs_last_error_length(), 6, "A null buffer leaves the error in place.");
    assert_eq!(last_error().as_deref(), Some("short"));
}
