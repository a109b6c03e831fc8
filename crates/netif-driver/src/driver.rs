use crate::{MacAddr, NetError, Netif, Pbuf, ETHERNET_MTU, MAX_ETH_FRAME_LEN};

/// Entry points a host network stack requires of a link-layer driver.
///
/// Only identity, presence, receive, link and transmit carry real behavior and must be provided.
/// Everything else has a constant-returning default so a driver can satisfy the full contract
/// without stubbing every query by hand.
///
/// All methods are called from the stack's poll loop and must not block.
pub trait NetifDriver {
    /// The hardware address the interface should use.
    fn get_system_mac(&mut self) -> MacAddr;

    /// Whether the hardware is present and usable.
    fn has_hardware(&mut self) -> bool;

    /// Drain received frames into `netif`. Called once per stack poll cycle.
    fn proc_input(&mut self, netif: &mut dyn Netif);

    /// Reconcile the stack's cached link state with the hardware. Called once per poll cycle.
    fn poll(&mut self, netif: &mut dyn Netif);

    /// Transmit one frame. The first pad-size bytes of `pbuf` are stack padding.
    fn output(&mut self, pbuf: &Pbuf) -> Result<(), NetError>;

    /// Request a hardware address. Drivers whose hardware address is authoritative ignore it.
    fn set_mac(&mut self, mac: &MacAddr) {
        tracing::debug!(%mac, "driver_set_mac");
    }

    /// Chip-select pin for SPI-attached hardware.
    fn set_chip_select_pin(&mut self, _pin: i32) {}

    /// Bring the driver up. `mac` is the address the stack would like to use.
    fn init(&mut self, mac: &MacAddr) -> Result<(), NetError> {
        tracing::debug!(%mac, "driver_init");
        Ok(())
    }

    fn deinit(&mut self) {
        tracing::debug!("driver_deinit");
    }

    fn mtu(&self) -> usize {
        ETHERNET_MTU
    }

    fn max_frame_len(&self) -> usize {
        MAX_ETH_FRAME_LEN
    }

    /// Send a raw, already-framed Ethernet frame. Unsupported by default.
    fn output_frame(&mut self, frame: &[u8]) -> bool {
        tracing::debug!(len = frame.len(), "driver_output_frame: unsupported");
        false
    }

    /// Install or remove a receive MAC filter entry. Unsupported by default.
    fn set_mac_address_allowed(&mut self, mac: &MacAddr, allow: bool) -> bool {
        tracing::debug!(%mac, allow, "driver_set_mac_address_allowed: unsupported");
        false
    }

    fn is_unknown(&self) -> bool {
        tracing::debug!("driver_is_unknown");
        false
    }

    fn is_link_state_detectable(&self) -> bool {
        tracing::debug!("driver_is_link_state_detectable");
        true
    }

    /// Link speed in Mbps, or 0 if unknown.
    fn link_speed(&self) -> u32 {
        tracing::debug!("driver_link_speed");
        0
    }

    fn link_is_full_duplex(&self) -> bool {
        tracing::debug!("driver_link_is_full_duplex");
        true
    }

    fn link_is_crossover(&self) -> bool {
        tracing::debug!("driver_link_is_crossover");
        false
    }
}

impl<T: NetifDriver + ?Sized> NetifDriver for Box<T> {
    fn get_system_mac(&mut self) -> MacAddr {
        (**self).get_system_mac()
    }

    fn has_hardware(&mut self) -> bool {
        (**self).has_hardware()
    }

    fn proc_input(&mut self, netif: &mut dyn Netif) {
        (**self).proc_input(netif)
    }

    fn poll(&mut self, netif: &mut dyn Netif) {
        (**self).poll(netif)
    }

    fn output(&mut self, pbuf: &Pbuf) -> Result<(), NetError> {
        (**self).output(pbuf)
    }

    fn set_mac(&mut self, mac: &MacAddr) {
        (**self).set_mac(mac)
    }

    fn set_chip_select_pin(&mut self, pin: i32) {
        (**self).set_chip_select_pin(pin)
    }

    fn init(&mut self, mac: &MacAddr) -> Result<(), NetError> {
        (**self).init(mac)
    }

    fn deinit(&mut self) {
        (**self).deinit()
    }

    fn mtu(&self) -> usize {
        (**self).mtu()
    }

    fn max_frame_len(&self) -> usize {
        (**self).max_frame_len()
    }

    fn output_frame(&mut self, frame: &[u8]) -> bool {
        (**self).output_frame(frame)
    }

    fn set_mac_address_allowed(&mut self, mac: &MacAddr, allow: bool) -> bool {
        (**self).set_mac_address_allowed(mac, allow)
    }

    fn is_unknown(&self) -> bool {
        (**self).is_unknown()
    }

    fn is_link_state_detectable(&self) -> bool {
        (**self).is_link_state_detectable()
    }

    fn link_speed(&self) -> u32 {
        (**self).link_speed()
    }

    fn link_is_full_duplex(&self) -> bool {
        (**self).link_is_full_duplex()
    }

    fn link_is_crossover(&self) -> bool {
        (**self).link_is_crossover()
    }
}
