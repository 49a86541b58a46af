//! CDC-ACM driver.
//!
//! Implements the USB communications device class, abstract control model:
//! interface discovery and claiming, the SET_LINE_CODING control message,
//! and lock-guarded bulk read/write over the data interface's endpoint
//! pair. The driver is generic over [`UsbDeviceConnection`], so tests run
//! against a recording fake and production runs against the rusb backend.

use crate::device::{
    DEFAULT_READ_BUFFER_SIZE, DEFAULT_WRITE_BUFFER_SIZE, DeviceType, SerialDevice,
    SerialDeviceListener,
};
use crate::error::{Error, Result};
use crate::poll::{PollSource, PollingLoop};
use crate::usb::{
    DeviceInfo, USB_CLASS_CDC_DATA, USB_CLASS_COMM, USB_RECIP_INTERFACE, USB_TYPE_CLASS,
    UsbDeviceConnection,
};
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

/// CDC class request: set the line coding.
const SET_LINE_CODING: u8 = 0x20;

/// Request type of ACM class requests: class request, interface recipient.
const USB_RT_ACM: u8 = USB_TYPE_CLASS | USB_RECIP_INTERFACE;

/// Timeout of line-coding control transfers.
const CONTROL_TIMEOUT: Duration = Duration::from_millis(5000);

/// Line parameters of a virtual serial port.
///
/// The stop-bits, parity and data-bits fields carry the raw CDC codes
/// (stop bits: 0 = 1 bit, 1 = 1.5 bits, 2 = 2 bits; parity: 0 = none,
/// 1 = odd, 2 = even).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCoding {
    /// Baud rate in bits per second.
    pub baud_rate: u32,
    /// Stop-bits code.
    pub stop_bits: u8,
    /// Parity code.
    pub parity: u8,
    /// Data bits per character.
    pub data_bits: u8,
}

impl Default for LineCoding {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            stop_bits: 0,
            parity: 0,
            data_bits: 8,
        }
    }
}

impl LineCoding {
    /// Encode as the 7-byte SET_LINE_CODING payload: little-endian 32-bit
    /// baud rate followed by the three single-byte fields.
    pub fn encode(&self) -> [u8; 7] {
        let mut payload = [0u8; 7];
        LittleEndian::write_u32(&mut payload[..4], self.baud_rate);
        payload[4] = self.stop_bits;
        payload[5] = self.parity;
        payload[6] = self.data_bits;
        payload
    }
}

/// Shared I/O core: the connection, resolved endpoints and the reusable
/// scratch buffers. Created at open, shared weakly with the polling loop.
struct AcmIo<C> {
    conn: C,
    read_endpoint: u8,
    write_endpoint: u8,
    read_buf: Mutex<Box<[u8]>>,
    write_buf: Mutex<Box<[u8]>>,
}

impl<C: UsbDeviceConnection> AcmIo<C> {
    /// One bulk transfer into the read scratch buffer, bounded by
    /// `min(dest.len(), scratch.len())`, then copied out. A negative
    /// transport result means timeout and is normalized to 0.
    fn read(&self, dest: &mut [u8], timeout: Duration) -> Result<usize> {
        let mut buf = self
            .read_buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let amount = dest.len().min(buf.len());
        let read = self.conn.bulk_read(self.read_endpoint, &mut buf[..amount], timeout);
        let Ok(read) = usize::try_from(read) else {
            return Ok(0);
        };
        dest[..read].copy_from_slice(&buf[..read]);
        Ok(read)
    }

    /// Transmit all of `src` in chunks no larger than the write scratch
    /// buffer. The first chunk is submitted straight from the caller's
    /// slice; follow-up chunks are staged through the scratch buffer. Fails
    /// the moment a chunk reports zero or negative progress.
    fn write(&self, src: &[u8], timeout: Duration) -> Result<usize> {
        let mut buf = self
            .write_buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut offset = 0;

        while offset < src.len() {
            let chunk = (src.len() - offset).min(buf.len());
            let written = if offset == 0 {
                self.conn.bulk_write(self.write_endpoint, &src[..chunk], timeout)
            } else {
                buf[..chunk].copy_from_slice(&src[offset..offset + chunk]);
                self.conn.bulk_write(self.write_endpoint, &buf[..chunk], timeout)
            };

            let written = usize::try_from(written).unwrap_or(0);
            if written == 0 {
                return Err(Error::Write {
                    chunk,
                    offset,
                    total: src.len(),
                });
            }
            offset += written;
        }

        Ok(offset)
    }
}

impl<C: UsbDeviceConnection> PollSource for AcmIo<C> {
    fn poll_read(&self, dest: &mut [u8], timeout: Duration) -> Result<usize> {
        self.read(dest, timeout)
    }
}

/// Driver for a USB CDC-ACM virtual serial port.
///
/// State machine: Closed → [`open`](SerialDevice::open) → Open →
/// [`close`](SerialDevice::close) → Closed. Open is all-or-nothing: any
/// failure mid-open releases already-claimed interfaces before the error
/// surfaces.
pub struct CdcAcmDevice<C: UsbDeviceConnection + 'static> {
    info: DeviceInfo,
    /// Connection while closed; moves into the I/O core on open.
    conn: Option<C>,
    io: Option<Arc<AcmIo<C>>>,
    ctrl_interface: u8,
    data_interface: u8,
    ctrl_endpoint: Option<u8>,
    line: LineCoding,
    poller: Option<PollingLoop>,
}

impl<C: UsbDeviceConnection + 'static> CdcAcmDevice<C> {
    /// Wrap an already-open, already-permitted device connection.
    pub fn new(info: DeviceInfo, conn: C) -> Self {
        Self {
            info,
            conn: Some(conn),
            io: None,
            ctrl_interface: 0,
            data_interface: 1,
            ctrl_endpoint: None,
            line: LineCoding::default(),
            poller: None,
        }
    }

    /// Descriptor view this driver was constructed with.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Current line parameters.
    pub fn line_coding(&self) -> LineCoding {
        self.line
    }

    /// Control endpoint address, resolved at open.
    pub fn control_endpoint(&self) -> Option<u8> {
        self.ctrl_endpoint
    }

    /// Push the current line coding to the device.
    fn send_line_coding(&self) -> Result<()> {
        let io = self.io.as_ref().ok_or(Error::NotOpen)?;
        send_line_coding(&io.conn, self.line)
    }
}

/// Issue the SET_LINE_CODING control transfer, surfacing short or negative
/// results as errors.
fn send_line_coding<C: UsbDeviceConnection>(conn: &C, line: LineCoding) -> Result<()> {
    let payload = line.encode();
    let result = conn.control_transfer(USB_RT_ACM, SET_LINE_CODING, 0, 0, &payload, CONTROL_TIMEOUT);
    if usize::try_from(result) != Ok(payload.len()) {
        return Err(Error::ControlTransfer {
            request: SET_LINE_CODING,
            result,
        });
    }
    Ok(())
}

impl<C: UsbDeviceConnection + 'static> SerialDevice for CdcAcmDevice<C> {
    fn device_type(&self) -> DeviceType {
        DeviceType::CdcAcm
    }

    fn is_open(&self) -> bool {
        self.io.is_some()
    }

    fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }

        if self.info.interface_count() < 2 {
            return Err(Error::Config("interface count is too low".into()));
        }
        let ctrl = self.info.interfaces[0].clone();
        if ctrl.class != USB_CLASS_COMM {
            return Err(Error::Config("wrong control interface class".into()));
        }
        let data = self.info.interfaces[1].clone();
        if data.class != USB_CLASS_CDC_DATA {
            return Err(Error::Config("wrong data interface class".into()));
        }
        let Some(&write_endpoint) = data.endpoints.first() else {
            return Err(Error::Config("data interface has no write endpoint".into()));
        };
        let Some(&read_endpoint) = data.endpoints.get(1) else {
            return Err(Error::Config("data interface has no read endpoint".into()));
        };

        let conn = self
            .conn
            .take()
            .ok_or_else(|| Error::Config("device connection is no longer available".into()))?;

        if !conn.claim_interface(ctrl.number, true) {
            self.conn = Some(conn);
            return Err(Error::Claim {
                interface: ctrl.number,
            });
        }
        if !conn.claim_interface(data.number, true) {
            conn.release_interface(ctrl.number);
            self.conn = Some(conn);
            return Err(Error::Claim {
                interface: data.number,
            });
        }

        let line = LineCoding::default();
        if let Err(e) = send_line_coding(&conn, line) {
            conn.release_interface(data.number);
            conn.release_interface(ctrl.number);
            self.conn = Some(conn);
            return Err(e);
        }

        debug!(
            "Opened CDC-ACM device {:04x}:{:04x} (read {read_endpoint:#04x}, write {write_endpoint:#04x})",
            self.info.vendor_id, self.info.product_id
        );

        self.ctrl_interface = ctrl.number;
        self.data_interface = data.number;
        self.ctrl_endpoint = ctrl.endpoints.first().copied();
        self.line = line;
        self.io = Some(Arc::new(AcmIo {
            conn,
            read_endpoint,
            write_endpoint,
            read_buf: Mutex::new(vec![0u8; DEFAULT_READ_BUFFER_SIZE].into_boxed_slice()),
            write_buf: Mutex::new(vec![0u8; DEFAULT_WRITE_BUFFER_SIZE].into_boxed_slice()),
        }));
        Ok(())
    }

    fn close(&mut self) {
        self.stop_polling();

        if let Some(io) = self.io.take() {
            io.conn.release_interface(self.data_interface);
            io.conn.release_interface(self.ctrl_interface);
            match Arc::try_unwrap(io) {
                // Keep the connection so the device can be reopened.
                Ok(io) => self.conn = Some(io.conn),
                Err(_) => warn!("I/O core still referenced at close; dropping connection"),
            }
            debug!(
                "Closed CDC-ACM device {:04x}:{:04x}",
                self.info.vendor_id, self.info.product_id
            );
        }
    }

    fn read(&self, dest: &mut [u8], timeout: Duration) -> Result<usize> {
        let io = self.io.as_ref().ok_or(Error::NotOpen)?;
        io.read(dest, timeout)
    }

    fn write(&self, src: &[u8], timeout: Duration) -> Result<usize> {
        let io = self.io.as_ref().ok_or(Error::NotOpen)?;
        io.write(src, timeout)
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        self.line.baud_rate = baud_rate;
        self.send_line_coding()
    }

    fn set_stop_bits(&mut self, stop_bits: u8) -> Result<()> {
        self.line.stop_bits = stop_bits;
        self.send_line_coding()
    }

    fn set_parity(&mut self, parity: u8) -> Result<()> {
        self.line.parity = parity;
        self.send_line_coding()
    }

    fn set_data_bits(&mut self, data_bits: u8) -> Result<()> {
        self.line.data_bits = data_bits;
        self.send_line_coding()
    }

    fn start_polling(&mut self, listener: &Arc<dyn SerialDeviceListener>) -> Result<()> {
        let io = self.io.as_ref().ok_or(Error::NotOpen)?;
        match &self.poller {
            Some(poller) => poller.set_listener(listener),
            None => {
                let weak = Arc::downgrade(io);
                let source: Weak<dyn PollSource> = weak;
                self.poller = Some(PollingLoop::start(source, Arc::downgrade(listener)));
            },
        }
        Ok(())
    }

    fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }

    fn set_listener(&mut self, listener: Option<&Arc<dyn SerialDeviceListener>>) -> Result<()> {
        match listener {
            Some(listener) => self.start_polling(listener),
            None => {
                self.stop_polling();
                Ok(())
            },
        }
    }
}

impl<C: UsbDeviceConnection + 'static> Drop for CdcAcmDevice<C> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usb::fake::{FakeConnection, acm_device_info};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Instant;

    const DEFAULT_ENCODING: [u8; 7] = [0x00, 0xC2, 0x01, 0x00, 0x00, 0x00, 0x08];

    fn opened() -> CdcAcmDevice<FakeConnection> {
        let mut dev = CdcAcmDevice::new(acm_device_info(), FakeConnection::new());
        dev.open().unwrap();
        dev
    }

    fn fake(dev: &CdcAcmDevice<FakeConnection>) -> &FakeConnection {
        &dev.io.as_ref().unwrap().conn
    }

    #[derive(Default)]
    struct Recorder {
        chunks: Mutex<Vec<Vec<u8>>>,
        deliveries: AtomicUsize,
    }

    impl SerialDeviceListener for Recorder {
        fn on_data_read(&self, data: &[u8]) {
            self.chunks.lock().unwrap().push(data.to_vec());
            self.deliveries.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_line_coding_default_encoding() {
        assert_eq!(LineCoding::default().encode(), DEFAULT_ENCODING);
    }

    #[test]
    fn test_line_coding_baud_is_little_endian() {
        let line = LineCoding {
            baud_rate: 9600,
            stop_bits: 2,
            parity: 1,
            data_bits: 7,
        };
        assert_eq!(line.encode(), [0x80, 0x25, 0x00, 0x00, 0x02, 0x01, 0x07]);
    }

    #[test]
    fn test_open_requires_two_interfaces() {
        let mut info = acm_device_info();
        info.interfaces.truncate(1);
        let mut dev = CdcAcmDevice::new(info, FakeConnection::new());

        assert!(matches!(dev.open(), Err(Error::Config(_))));
        assert!(!dev.is_open());
        assert!(dev.conn.as_ref().unwrap().claim_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_open_checks_interface_classes() {
        let mut info = acm_device_info();
        info.interfaces[0].class = 0x03;
        let mut dev = CdcAcmDevice::new(info, FakeConnection::new());

        assert!(matches!(dev.open(), Err(Error::Config(_))));
        assert!(dev.conn.as_ref().unwrap().claim_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_data_claim_releases_control_interface() {
        let conn = FakeConnection {
            refuse_claims: vec![1],
            ..FakeConnection::new()
        };
        let mut dev = CdcAcmDevice::new(acm_device_info(), conn);

        assert!(matches!(dev.open(), Err(Error::Claim { interface: 1 })));
        let conn = dev.conn.as_ref().unwrap();
        assert_eq!(*conn.claim_calls.lock().unwrap(), vec![0]);
        assert_eq!(*conn.release_calls.lock().unwrap(), vec![0]);
        assert_eq!(conn.claimed_balance(), 0);
    }

    #[test]
    fn test_open_claims_and_sends_default_line_coding() {
        let dev = opened();
        let conn = fake(&dev);

        assert_eq!(*conn.claim_calls.lock().unwrap(), vec![0, 1]);
        let log = conn.control_log.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].request_type, 0x21);
        assert_eq!(log[0].request, 0x20);
        assert_eq!(log[0].value, 0);
        assert_eq!(log[0].index, 0);
        assert_eq!(log[0].data, DEFAULT_ENCODING);
    }

    #[test]
    fn test_open_is_idempotent() {
        let mut dev = opened();
        dev.open().unwrap();
        assert_eq!(*fake(&dev).claim_calls.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_failed_line_coding_unwinds_claims() {
        let conn = FakeConnection::new();
        *conn.control_result.lock().unwrap() = Some(-9);
        let mut dev = CdcAcmDevice::new(acm_device_info(), conn);

        assert!(matches!(
            dev.open(),
            Err(Error::ControlTransfer {
                request: 0x20,
                result: -9
            })
        ));
        assert!(!dev.is_open());
        assert_eq!(dev.conn.as_ref().unwrap().claimed_balance(), 0);
    }

    #[test]
    fn test_setters_resend_line_coding() {
        let mut dev = opened();
        dev.set_baud_rate(9600).unwrap();
        dev.set_stop_bits(2).unwrap();

        let log = fake(&dev).control_log.lock().unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log[1].data[..4], [0x80, 0x25, 0x00, 0x00]);
        assert_eq!(log[2].data[4], 2);
    }

    #[test]
    fn test_setter_surfaces_control_failure() {
        let mut dev = opened();
        *fake(&dev).control_result.lock().unwrap() = Some(-1);
        assert!(matches!(
            dev.set_parity(1),
            Err(Error::ControlTransfer { .. })
        ));
    }

    #[test]
    fn test_read_normalizes_timeout_to_zero() {
        let dev = opened();
        let mut dest = [0xAA; 8];
        let read = dev.read(&mut dest, Duration::from_millis(10)).unwrap();
        assert_eq!(read, 0);
        assert_eq!(dest, [0xAA; 8]);
    }

    #[test]
    fn test_read_copies_into_destination() {
        let dev = opened();
        fake(&dev).push_read(b"abc");
        let mut dest = [0u8; 8];
        let read = dev.read(&mut dest, Duration::from_millis(10)).unwrap();
        assert_eq!(read, 3);
        assert_eq!(&dest[..3], b"abc");
    }

    #[test]
    fn test_read_bounded_by_scratch_buffer() {
        let dev = opened();
        fake(&dev).push_read(&vec![0x55; 64 * 1024]);
        let mut dest = vec![0u8; 64 * 1024];
        let read = dev.read(&mut dest, Duration::from_millis(10)).unwrap();
        assert_eq!(read, DEFAULT_READ_BUFFER_SIZE);
    }

    #[test]
    fn test_write_chunks_in_order() {
        let dev = opened();
        let src: Vec<u8> = (0..40_000u32).map(|i| (i % 251) as u8).collect();

        let written = dev.write(&src, Duration::from_millis(100)).unwrap();
        assert_eq!(written, src.len());

        let writes = fake(&dev).bulk_writes.lock().unwrap();
        assert_eq!(writes.len(), 3);
        assert!(writes.iter().all(|(ep, _)| *ep == 0x01));
        assert_eq!(writes[0].1.len(), DEFAULT_WRITE_BUFFER_SIZE);
        assert_eq!(writes[1].1.len(), DEFAULT_WRITE_BUFFER_SIZE);
        assert_eq!(writes[2].1.len(), 40_000 - 2 * DEFAULT_WRITE_BUFFER_SIZE);

        let joined: Vec<u8> = writes.iter().flat_map(|(_, d)| d.clone()).collect();
        assert_eq!(joined, src);
    }

    #[test]
    fn test_write_small_buffer_single_transfer() {
        let dev = opened();
        dev.write(b"hi", Duration::from_millis(100)).unwrap();
        let writes = fake(&dev).bulk_writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1, b"hi");
    }

    #[test]
    fn test_write_stops_on_failed_chunk() {
        let dev = opened();
        fake(&dev)
            .write_results
            .lock()
            .unwrap()
            .extend([DEFAULT_WRITE_BUFFER_SIZE as i32, 0]);
        let src = vec![0x42u8; 40_000];

        let err = dev.write(&src, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(
            err,
            Error::Write {
                offset: 16384,
                total: 40_000,
                ..
            }
        ));
        assert_eq!(fake(&dev).bulk_writes.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_concurrent_read_and_write_stay_consistent() {
        let dev = Arc::new(opened());
        for _ in 0..32 {
            fake(&dev).push_read(&[0x5A; 512]);
        }
        let src: Vec<u8> = (0..50_000u32).map(|i| (i % 241) as u8).collect();

        let writer = {
            let dev = Arc::clone(&dev);
            let src = src.clone();
            thread::spawn(move || dev.write(&src, Duration::from_millis(100)).unwrap())
        };

        let mut received = Vec::new();
        let mut dest = [0u8; 4096];
        let start = Instant::now();
        while received.len() < 32 * 512 && start.elapsed() < Duration::from_secs(5) {
            let n = dev.read(&mut dest, Duration::from_millis(10)).unwrap();
            received.extend_from_slice(&dest[..n]);
        }
        assert_eq!(writer.join().unwrap(), src.len());

        assert_eq!(received, vec![0x5A; 32 * 512]);
        let writes = fake(&dev).bulk_writes.lock().unwrap();
        let joined: Vec<u8> = writes.iter().flat_map(|(_, d)| d.clone()).collect();
        assert_eq!(joined, src);
    }

    #[test]
    fn test_polling_delivers_device_data() {
        let mut dev = opened();
        fake(&dev).push_read(b"poll me");
        let recorder = Arc::new(Recorder::default());
        let listener: Arc<dyn SerialDeviceListener> = Arc::clone(&recorder) as _;

        dev.start_polling(&listener).unwrap();
        let start = Instant::now();
        while recorder.deliveries.load(Ordering::SeqCst) == 0
            && start.elapsed() < Duration::from_secs(2)
        {
            thread::sleep(Duration::from_millis(5));
        }
        dev.stop_polling();

        let chunks = recorder.chunks.lock().unwrap();
        let joined: Vec<u8> = chunks.iter().flatten().copied().collect();
        assert_eq!(joined, b"poll me");
    }

    #[test]
    fn test_start_polling_twice_reuses_loop() {
        let mut dev = opened();
        let first: Arc<dyn SerialDeviceListener> = Arc::new(Recorder::default());
        let second_rec = Arc::new(Recorder::default());
        let second: Arc<dyn SerialDeviceListener> = Arc::clone(&second_rec) as _;

        dev.start_polling(&first).unwrap();
        let thread_id = dev.poller.as_ref().unwrap().thread_id();
        dev.start_polling(&second).unwrap();
        assert_eq!(dev.poller.as_ref().unwrap().thread_id(), thread_id);

        fake(&dev).push_read(b"swapped");
        let start = Instant::now();
        while second_rec.deliveries.load(Ordering::SeqCst) == 0
            && start.elapsed() < Duration::from_secs(2)
        {
            thread::sleep(Duration::from_millis(5));
        }
        dev.stop_polling();
        assert!(second_rec.deliveries.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_clearing_listener_stops_loop() {
        let mut dev = opened();
        let listener: Arc<dyn SerialDeviceListener> = Arc::new(Recorder::default());
        dev.start_polling(&listener).unwrap();
        assert!(dev.poller.is_some());

        dev.set_listener(None).unwrap();
        assert!(dev.poller.is_none());
    }

    #[test]
    fn test_close_releases_interfaces_and_allows_reopen() {
        let mut dev = opened();
        let listener: Arc<dyn SerialDeviceListener> = Arc::new(Recorder::default());
        dev.start_polling(&listener).unwrap();

        dev.close();
        assert!(!dev.is_open());
        assert!(dev.poller.is_none());
        assert_eq!(dev.conn.as_ref().unwrap().claimed_balance(), 0);

        dev.open().unwrap();
        assert!(dev.is_open());
        assert_eq!(fake(&dev).claimed_balance(), 2);
    }

    #[test]
    fn test_read_and_write_require_open_device() {
        let dev = CdcAcmDevice::new(acm_device_info(), FakeConnection::new());
        let mut dest = [0u8; 4];
        assert!(matches!(
            dev.read(&mut dest, Duration::from_millis(10)),
            Err(Error::NotOpen)
        ));
        assert!(matches!(
            dev.write(b"x", Duration::from_millis(10)),
            Err(Error::NotOpen)
        ));
    }

    #[test]
    fn test_endpoints_resolved_from_descriptor() {
        let dev = opened();
        assert_eq!(dev.control_endpoint(), Some(0x82));
        let io = dev.io.as_ref().unwrap();
        assert_eq!(io.read_endpoint, 0x81);
        assert_eq!(io.write_endpoint, 0x01);
    }

    #[test]
    fn test_missing_read_endpoint_fails_open() {
        let mut info = acm_device_info();
        info.interfaces[1].endpoints.truncate(1);
        let mut dev = CdcAcmDevice::new(info, FakeConnection::new());
        assert!(matches!(dev.open(), Err(Error::Config(_))));
        assert_eq!(dev.conn.as_ref().unwrap().claimed_balance(), 0);
    }
}
