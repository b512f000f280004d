#[cfg(test)]
mod pipeline_tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    use sandbox_creator::orchestrator::{generate, GenerateOptions};
    use sandbox_creator::sandbox::DevicePurpose;

    const TOPOLOGY: &str = r#"
name: training
hosts:
  - name: attacker
    base_box:
      image: munikypo/kali
      man_user: kali
    flavor: standard.small
  - name: victim
    base_box:
      image: munikypo/windows-10
      mgmt_protocol: WINRM
    flavor: standard.medium
    extra:
      usb_passthrough: true
routers:
  - name: router
    base_box:
      image: munikypo/debian-10
networks:
  - name: outside
    cidr: 10.1.0.0/24
  - name: inside
    cidr: 10.2.0.0/24
    accessible_by_user: false
net_mappings:
  - host: attacker
    network: outside
    ip: 10.1.0.10
  - host: victim
    network: inside
    ip: 10.2.0.10
router_mappings:
  - router: router
    network: outside
    ip: 10.1.0.1
  - router: router
    network: inside
    ip: 10.2.0.1
groups:
  - name: targets
    nodes:
      - victim
"#;

    fn write_topology(dir: &Path, yaml: &str) -> PathBuf {
        let path = dir.join("topology.yml");
        fs::write(&path, yaml).unwrap();
        path
    }

    fn options(dir: &TempDir) -> GenerateOptions {
        GenerateOptions {
            topology: write_topology(dir.path(), TOPOLOGY),
            output_dir: Some(dir.path().join("out")),
            ..Default::default()
        }
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
    }

    /// Generate a sandbox and check every produced file
    #[test]
    fn test_generate_sandbox_directory() {
        let dir = TempDir::new().unwrap();
        let sandbox = generate(&options(&dir)).unwrap();
        let out = dir.path().join("out");

        let purposes: Vec<DevicePurpose> = sandbox.devices.iter().map(|d| d.purpose).collect();
        assert_eq!(
            purposes,
            vec![DevicePurpose::Router, DevicePurpose::Host, DevicePurpose::Host, DevicePurpose::Controller]
        );

        let vagrantfile = read(out.join("Vagrantfile"));
        assert!(vagrantfile.contains("Vagrant.configure(\"2\") do |config|"));
        assert!(vagrantfile.contains("config.vm.define \"controller\" do |device|"));
        assert!(vagrantfile.contains("\"targets\" => [\"victim\"]"));
        assert!(vagrantfile.contains("device.vm.box = \"munikypo/kali\""));

        let router_vars = read(out.join("preconfig/host_vars/router.yml"));
        assert!(router_vars.starts_with("---\n"));
        assert!(router_vars.ends_with("...\n"));
        assert!(router_vars.contains("interface_ip: 100.100.100.1"));

        let attacker_vars = read(out.join("preconfig/host_vars/attacker.yml"));
        assert!(attacker_vars.contains("interface_default_gateway: 10.1.0.1"));
        assert!(attacker_vars.contains("10.1.0.1: router"));

        assert!(read(out.join("preconfig/group_vars/all.yml")).contains("controller_name: controller"));
        assert!(read(out.join("preconfig/group_vars/ssh.yml")).contains("ansible_connection: local"));
        assert!(read(out.join("preconfig/group_vars/winrm.yml")).contains("ansible_port: 5986"));
        assert!(!out.join("preconfig/group_vars/hosts.yml").exists());
        assert!(!out.join("preconfig/group_vars/routers.yml").exists());
        assert!(out.join("preconfig/playbook.yml").is_file());

        assert!(out.join("provisioning/playbook.yml").is_file());
        assert!(read(out.join("provisioning/group_vars/winrm.yml")).contains("ansible_connection: winrm"));
    }

    #[test]
    fn test_strip_image_prefix() {
        let dir = TempDir::new().unwrap();
        let mut options = options(&dir);
        options.strip_image_prefix = Some("munikypo/".to_string());

        let sandbox = generate(&options).unwrap();
        let images: Vec<&str> = sandbox.devices.iter().map(|d| d.image.as_str()).collect();
        assert!(images.contains(&"kali"));
        assert!(images.contains(&"debian-10"));
        assert!(read(dir.path().join("out/Vagrantfile")).contains("device.vm.box = \"kali\""));
    }

    #[test]
    fn test_existing_provisioning_is_kept() {
        let dir = TempDir::new().unwrap();
        let options = options(&dir);
        generate(&options).unwrap();

        let playbook = dir.path().join("out/provisioning/playbook.yml");
        fs::write(&playbook, "---\n# edited\n").unwrap();
        generate(&options).unwrap();
        assert_eq!(read(playbook.clone()), "---\n# edited\n");

        let mut regenerate = options.clone();
        regenerate.generate_provisioning = true;
        generate(&regenerate).unwrap();
        assert_ne!(read(playbook), "---\n# edited\n");
    }

    #[test]
    fn test_user_provisioning_and_extra_vars() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user-provisioning");
        fs::create_dir_all(user.join("roles/web")).unwrap();
        fs::write(user.join("playbook.yml"), "---\n- hosts: all\n").unwrap();
        fs::write(user.join("requirements.yml"), "---\n").unwrap();
        fs::write(user.join("roles/web/main.yml"), "---\n").unwrap();
        let extra = dir.path().join("extra.yml");
        fs::write(&extra, "flag: secret\n").unwrap();

        let mut options = options(&dir);
        options.provisioning_dir = Some(user);
        options.extra_vars = Some(extra);
        options.ansible_installed = true;
        let sandbox = generate(&options).unwrap();
        assert!(!sandbox.controller_present);

        let out = dir.path().join("out");
        assert_eq!(read(out.join("provisioning/playbook.yml")), "---\n- hosts: all\n");
        assert!(out.join("provisioning/roles/web/main.yml").is_file());
        assert_eq!(read(out.join("provisioning/extra_vars.yml")), "flag: secret\n");

        let vagrantfile = read(out.join("Vagrantfile"));
        assert!(vagrantfile.contains("ansible.extra_vars = \"provisioning/extra_vars.yml\""));
        assert!(vagrantfile.contains("ansible.galaxy_roles_path = \"provisioning/roles\""));
        assert!(read(out.join("preconfig/group_vars/ssh.yml")).contains("ansible_host: 127.0.0.1"));
    }

    #[test]
    fn test_default_output_dir() {
        let dir = TempDir::new().unwrap();
        let options = GenerateOptions {
            topology: write_topology(dir.path(), TOPOLOGY),
            ansible_installed: true,
            ..Default::default()
        };
        generate(&options).unwrap();
        assert!(dir.path().join("sandbox/Vagrantfile").is_file());
    }

    #[test]
    fn test_invalid_topology_fails() {
        let dir = TempDir::new().unwrap();
        let yaml = TOPOLOGY.replace("ip: 10.2.0.10", "ip: 10.2.0.1");
        let options = GenerateOptions {
            topology: write_topology(dir.path(), &yaml),
            output_dir: Some(dir.path().join("out")),
            ..Default::default()
        };

        let report = format!("{:?}", generate(&options).unwrap_err());
        assert!(report.contains("Definition parsing has failed"), "{}", report);
        assert!(report.contains("10.2.0.1"), "{}", report);
        assert!(!dir.path().join("out/Vagrantfile").exists());
    }

    #[test]
    fn test_unrouted_network_writes_nothing() {
        let yaml = r#"
name: unrouted
hosts:
  - name: a
    base_box:
      image: debian-10
    flavor: standard.small
  - name: b
    base_box:
      image: debian-10
    flavor: standard.small
routers:
  - name: router
    base_box:
      image: debian-10
networks:
  - name: net1
    cidr: 10.0.1.0/24
  - name: net2
    cidr: 10.0.2.0/24
net_mappings:
  - host: a
    network: net1
    ip: 10.0.1.10
  - host: b
    network: net2
    ip: 10.0.2.10
router_mappings:
  - router: router
    network: net1
    ip: 10.0.1.1
groups: []
"#;
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let previous = out.join("preconfig/playbook.yml");
        fs::create_dir_all(previous.parent().unwrap()).unwrap();
        fs::write(&previous, "---\n# previous run\n").unwrap();

        let options = GenerateOptions {
            topology: write_topology(dir.path(), yaml),
            output_dir: Some(out.clone()),
            ..Default::default()
        };
        let report = format!("{:?}", generate(&options).unwrap_err());
        assert!(report.contains("Definition parsing has failed"), "{}", report);
        assert!(report.contains("net2"), "{}", report);

        assert!(!out.join("Vagrantfile").exists());
        assert!(!out.join("preconfig/host_vars").exists());
        assert!(!out.join("provisioning").exists());
        assert_eq!(read(previous), "---\n# previous run\n");
    }

    #[test]
    fn test_missing_provisioning_playbook_fails() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty");
        fs::create_dir_all(&empty).unwrap();

        let mut options = options(&dir);
        options.provisioning_dir = Some(empty);
        let report = format!("{:?}", generate(&options).unwrap_err());
        assert!(report.contains("playbook.yml"), "{}", report);
    }
}
