// Flash Config Store - durable Persistenz der Geräte-Konfiguration
//
// Belegt den letzten 4-KiB-Sektor der NVS-Datenpartition mit genau einem
// Record: Magic, Version, vier Längen-Bytes, vier Feld-Slots fester
// Breite und eine FNV-1a-Prüfsumme. save() löscht den Sektor und
// schreibt den Record neu - eine logische Transaktion; ein abgerissener
// Schreibvorgang fällt beim nächsten load() über die Prüfsumme auf.

use embedded_storage::{ReadStorage, Storage};
use esp_bootloader_esp_idf::partitions::{
    DataPartitionSubType, PARTITION_TABLE_MAX_LEN, PartitionType, read_partition_table,
};
use esp_rom_sys::rom::spiflash::{
    ESP_ROM_SPIFLASH_RESULT_OK, esp_rom_spiflash_erase_sector, esp_rom_spiflash_read,
    esp_rom_spiflash_unlock, esp_rom_spiflash_write,
};

use esp_core::config::{CONFIG_FIELD_MAX, SERVER_ADDR_MAX};
use esp_core::{ConfigStore, DeviceConfig};

const FLASH_SECTOR_SIZE: u32 = 4096;
const DEFAULT_FLASH_CAPACITY_BYTES: usize = 8 * 1024 * 1024;

const RECORD_MAGIC: u32 = 0x3158_4252; // "RBX1"
const RECORD_VERSION: u8 = 1;

// Record-Layout (Offsets in Bytes)
const OFFSET_VERSION: usize = 4;
const OFFSET_LENGTHS: usize = 5;
const OFFSET_SSID: usize = 9;
const OFFSET_PASS: usize = OFFSET_SSID + CONFIG_FIELD_MAX;
const OFFSET_NAME: usize = OFFSET_PASS + CONFIG_FIELD_MAX;
const OFFSET_SERVER: usize = OFFSET_NAME + CONFIG_FIELD_MAX;
// Prüfsumme auf die nächste Wort-Grenze ausgerichtet
const OFFSET_CHECKSUM: usize = (OFFSET_SERVER + SERVER_ADDR_MAX + 3) & !3;
const RECORD_LEN: usize = OFFSET_CHECKSUM + 4;

/// Fehler-Typen des Flash Config Stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashStoreError {
    /// Partitionstabelle konnte nicht gelesen werden
    PartitionTable,
    /// Keine beschreibbare NVS-Datenpartition gefunden
    PartitionMissing,
    /// Partition kleiner als ein Flash-Sektor
    PartitionTooSmall,
    /// ROM-Flash-Operation fehlgeschlagen (Rückgabecode)
    FlashOpFailed(i32),
    /// Record vorhanden, aber Prüfsumme oder Inhalt beschädigt
    Corrupted,
    /// Nicht unterstützte Adresse/Ausrichtung
    Unsupported,
}

impl defmt::Format for FlashStoreError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            FlashStoreError::PartitionTable => defmt::write!(fmt, "partition table unreadable"),
            FlashStoreError::PartitionMissing => defmt::write!(fmt, "nvs partition missing"),
            FlashStoreError::PartitionTooSmall => defmt::write!(fmt, "partition too small"),
            FlashStoreError::FlashOpFailed(rc) => defmt::write!(fmt, "flash op failed ({})", rc),
            FlashStoreError::Corrupted => defmt::write!(fmt, "record corrupted"),
            FlashStoreError::Unsupported => defmt::write!(fmt, "unsupported flash access"),
        }
    }
}

/// Roher Flash-Zugriff über die ROM-Routinen
///
/// Wort-orientiert; read_bytes/write_erased_bytes übernehmen die
/// Ausrichtung auf 4-Byte-Grenzen.
struct RawFlash;

impl RawFlash {
    fn new() -> Result<Self, FlashStoreError> {
        let rc = unsafe { esp_rom_spiflash_unlock() };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashStoreError::FlashOpFailed(rc));
        }
        Ok(Self)
    }

    fn erase_sector(&mut self, sector_addr: u32) -> Result<(), FlashStoreError> {
        if !sector_addr.is_multiple_of(FLASH_SECTOR_SIZE) {
            return Err(FlashStoreError::Unsupported);
        }

        let sector = sector_addr / FLASH_SECTOR_SIZE;
        let rc = unsafe { esp_rom_spiflash_erase_sector(sector) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashStoreError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_word(&mut self, addr: u32) -> Result<u32, FlashStoreError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashStoreError::Unsupported);
        }

        let mut word = 0u32;
        let rc = unsafe { esp_rom_spiflash_read(addr, &mut word as *mut u32 as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashStoreError::FlashOpFailed(rc));
        }
        Ok(word)
    }

    fn write_word(&mut self, addr: u32, word: u32) -> Result<(), FlashStoreError> {
        if !addr.is_multiple_of(4) {
            return Err(FlashStoreError::Unsupported);
        }

        let rc = unsafe { esp_rom_spiflash_write(addr, &word as *const u32, 4) };
        if rc != ESP_ROM_SPIFLASH_RESULT_OK {
            return Err(FlashStoreError::FlashOpFailed(rc));
        }
        Ok(())
    }

    fn read_bytes(&mut self, addr: u32, out: &mut [u8]) -> Result<(), FlashStoreError> {
        if out.is_empty() {
            return Ok(());
        }

        let start = addr & !0b11;
        let end = (addr + out.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let word = self.read_word(word_addr)?;
            let bytes = word.to_le_bytes();

            let base = word_addr as i64 - addr as i64;
            for (i, b) in bytes.iter().enumerate() {
                let dst = base + i as i64;
                if dst < 0 {
                    continue;
                }
                let dst = dst as usize;
                if dst >= out.len() {
                    break;
                }
                out[dst] = *b;
            }
        }

        Ok(())
    }

    /// Schreibt in einen zuvor gelöschten Bereich (Bits nur 1 → 0)
    fn write_erased_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashStoreError> {
        if data.is_empty() {
            return Ok(());
        }

        let start = addr & !0b11;
        let end = (addr + data.len() as u32 + 3) & !0b11;

        for word_addr in (start..end).step_by(4) {
            let mut bytes = [0xFFu8; 4];
            let base = word_addr as i64 - addr as i64;
            for (i, slot) in bytes.iter_mut().enumerate() {
                let src = base + i as i64;
                if src < 0 {
                    continue;
                }
                let src = src as usize;
                if src >= data.len() {
                    break;
                }
                *slot = data[src];
            }

            self.write_word(word_addr, u32::from_le_bytes(bytes))?;
        }

        Ok(())
    }
}

// read_partition_table erwartet ein embedded-storage Medium
impl ReadStorage for RawFlash {
    type Error = FlashStoreError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(offset, bytes)
    }

    fn capacity(&self) -> usize {
        DEFAULT_FLASH_CAPACITY_BYTES
    }
}

impl Storage for RawFlash {
    fn write(&mut self, _offset: u32, _bytes: &[u8]) -> Result<(), Self::Error> {
        Err(FlashStoreError::Unsupported)
    }
}

/// Flash-gestützter Config Store
///
/// Produktions-Implementierung des `ConfigStore` Traits aus esp-core.
pub struct FlashConfigStore {
    flash: RawFlash,
    record_sector_addr: u32,
}

impl FlashConfigStore {
    /// Öffnet den Store: sucht die NVS-Datenpartition in der
    /// Partitionstabelle und merkt sich deren letzten Sektor
    pub fn new() -> Result<Self, FlashStoreError> {
        let mut flash = RawFlash::new()?;

        let mut table_buf = [0u8; PARTITION_TABLE_MAX_LEN];
        let table = read_partition_table(&mut flash, &mut table_buf)
            .map_err(|_| FlashStoreError::PartitionTable)?;

        let mut nvs: Option<(u32, u32)> = None;
        for entry in table.iter() {
            if entry.is_read_only() {
                continue;
            }
            if let PartitionType::Data(DataPartitionSubType::Nvs) = entry.partition_type() {
                nvs = Some((entry.offset(), entry.len()));
                break;
            }
        }

        let (offset, len) = nvs.ok_or(FlashStoreError::PartitionMissing)?;
        if len < FLASH_SECTOR_SIZE {
            return Err(FlashStoreError::PartitionTooSmall);
        }

        Ok(Self {
            flash,
            record_sector_addr: offset + len - FLASH_SECTOR_SIZE,
        })
    }

    fn decode_field<const N: usize>(
        buf: &[u8],
        offset: usize,
        len: usize,
    ) -> Result<heapless::String<N>, FlashStoreError> {
        if len > N {
            return Err(FlashStoreError::Corrupted);
        }

        let raw = &buf[offset..offset + len];
        let text = core::str::from_utf8(raw).map_err(|_| FlashStoreError::Corrupted)?;

        let mut value = heapless::String::new();
        value
            .push_str(text)
            .map_err(|_| FlashStoreError::Corrupted)?;
        Ok(value)
    }
}

impl ConfigStore for FlashConfigStore {
    type Error = FlashStoreError;

    /// Liest die Konfiguration; liefert NIE ein teilweise befülltes Ergebnis
    ///
    /// Leerer Sektor, fremdes Magic oder unbekannte Version gelten als
    /// "nicht vorhanden". Nur eine beschädigte Prüfsumme ist ein Fehler -
    /// die Aufrufer behandeln auch den als "nicht vorhanden" (fail open).
    fn load(&mut self) -> Result<Option<DeviceConfig>, Self::Error> {
        let mut buf = [0u8; RECORD_LEN];
        self.flash.read_bytes(self.record_sector_addr, &mut buf)?;

        if buf.iter().all(|b| *b == 0xFF) {
            return Ok(None);
        }

        let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if magic != RECORD_MAGIC || buf[OFFSET_VERSION] != RECORD_VERSION {
            return Ok(None);
        }

        let expected = u32::from_le_bytes([
            buf[OFFSET_CHECKSUM],
            buf[OFFSET_CHECKSUM + 1],
            buf[OFFSET_CHECKSUM + 2],
            buf[OFFSET_CHECKSUM + 3],
        ]);
        if checksum32(&buf[..OFFSET_CHECKSUM]) != expected {
            return Err(FlashStoreError::Corrupted);
        }

        let lens = &buf[OFFSET_LENGTHS..OFFSET_LENGTHS + 4];
        let cfg = DeviceConfig {
            wifi_ssid: Self::decode_field(&buf, OFFSET_SSID, lens[0] as usize)?,
            wifi_pass: Self::decode_field(&buf, OFFSET_PASS, lens[1] as usize)?,
            device_name: Self::decode_field(&buf, OFFSET_NAME, lens[2] as usize)?,
            server_addr: Self::decode_field(&buf, OFFSET_SERVER, lens[3] as usize)?,
        };

        // Vollständigkeits-Invariante: alles oder nichts
        if cfg.is_complete() { Ok(Some(cfg)) } else { Ok(None) }
    }

    /// Persistiert die Konfiguration als eine logische Transaktion
    fn save(&mut self, cfg: &DeviceConfig) -> Result<(), Self::Error> {
        let mut buf = [0u8; RECORD_LEN];
        buf[0..4].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
        buf[OFFSET_VERSION] = RECORD_VERSION;
        buf[OFFSET_LENGTHS] = cfg.wifi_ssid.len() as u8;
        buf[OFFSET_LENGTHS + 1] = cfg.wifi_pass.len() as u8;
        buf[OFFSET_LENGTHS + 2] = cfg.device_name.len() as u8;
        buf[OFFSET_LENGTHS + 3] = cfg.server_addr.len() as u8;
        buf[OFFSET_SSID..OFFSET_SSID + cfg.wifi_ssid.len()]
            .copy_from_slice(cfg.wifi_ssid.as_bytes());
        buf[OFFSET_PASS..OFFSET_PASS + cfg.wifi_pass.len()]
            .copy_from_slice(cfg.wifi_pass.as_bytes());
        buf[OFFSET_NAME..OFFSET_NAME + cfg.device_name.len()]
            .copy_from_slice(cfg.device_name.as_bytes());
        buf[OFFSET_SERVER..OFFSET_SERVER + cfg.server_addr.len()]
            .copy_from_slice(cfg.server_addr.as_bytes());

        let checksum = checksum32(&buf[..OFFSET_CHECKSUM]);
        buf[OFFSET_CHECKSUM..OFFSET_CHECKSUM + 4].copy_from_slice(&checksum.to_le_bytes());

        self.flash.erase_sector(self.record_sector_addr)?;
        self.flash.write_erased_bytes(self.record_sector_addr, &buf)
    }

    /// Löscht die Konfiguration; ein leerer Sektor bleibt leer (idempotent)
    fn erase(&mut self) -> Result<(), Self::Error> {
        self.flash.erase_sector(self.record_sector_addr)
    }
}

/// FNV-1a über den Record-Inhalt
fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C_9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}
