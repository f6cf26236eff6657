//! Bastion wrapper: SSM-managed host for operational database access.
//!
//! No inbound ports: access goes through Session Manager, so the instance
//! role carries `AmazonSSMManagedInstanceCore`. When an access-log bucket
//! is configured the role also gets put access on it. The shell bootstrap
//! of the instance is owned by operations, not by this synthesizer.

use serde_json::{Value, json};

use crate::stack::{DeployError, ResourceHandle, Stack};
use crate::wrapper::network::NetworkWrapper;

const INSTANCE_TYPE: &str = "t2.micro";
/// Latest Amazon Linux 2023 AMI, resolved by the deployment engine.
const AMI_SSM_PARAMETER: &str =
    "{{resolve:ssm:/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64}}";

pub struct BastionWrapper;

impl BastionWrapper {
    pub fn build(
        stack: &mut Stack,
        network: &NetworkWrapper,
        s3_logging_bucket_name: Option<&str>,
    ) -> Result<(), DeployError> {
        let role = create_role(stack, s3_logging_bucket_name)?;
        let profile = stack.add_resource(
            "bastion-profile",
            "AWS::IAM::InstanceProfile",
            json!({
                "InstanceProfileName": stack.resource_name("bastion-profile"),
                "Roles": [role.reference()],
            }),
        )?;
        create_instance(stack, network, &profile)?;
        Ok(())
    }
}

fn create_role(
    stack: &mut Stack,
    s3_logging_bucket_name: Option<&str>,
) -> Result<ResourceHandle, DeployError> {
    let role_name = stack.resource_name("bastion-role");
    let mut properties = json!({
        "RoleName": role_name,
        "AssumeRolePolicyDocument": {
            "Version": "2012-10-17",
            "Statement": [{
                "Effect": "Allow",
                "Principal": { "Service": "ec2.amazonaws.com" },
                "Action": "sts:AssumeRole",
            }],
        },
        "ManagedPolicyArns": [
            "arn:aws:iam::aws:policy/AmazonSSMManagedInstanceCore",
        ],
    });
    if let Some(bucket) = s3_logging_bucket_name {
        properties["Policies"] = json!([{
            "PolicyName": "session-log-write",
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [
                    {
                        "Effect": "Allow",
                        "Action": ["s3:PutObject", "s3:PutObjectAcl"],
                        "Resource": format!("arn:aws:s3:::{bucket}/*"),
                    },
                    {
                        "Effect": "Allow",
                        "Action": ["s3:GetEncryptionConfiguration"],
                        "Resource": format!("arn:aws:s3:::{bucket}"),
                    },
                ],
            },
        }]);
    }
    stack.add_resource("bastion-role", "AWS::IAM::Role", properties)
}

fn create_instance(
    stack: &mut Stack,
    network: &NetworkWrapper,
    profile: &ResourceHandle,
) -> Result<ResourceHandle, DeployError> {
    let instance_name = stack.resource_name("bastion-instance");
    let network_interface: Value = json!({
        "DeviceIndex": "0",
        "AssociatePublicIpAddress": true,
        "DeleteOnTermination": true,
        "GroupSet": [network.bastion_security_group.attribute("GroupId")],
        "SubnetId": network.bastion_subnet.reference(),
    });
    stack.add_resource(
        "bastion-instance",
        "AWS::EC2::Instance",
        json!({
            "AvailabilityZone": network.bastion_availability_zone,
            "InstanceType": INSTANCE_TYPE,
            "ImageId": AMI_SSM_PARAMETER,
            "DisableApiTermination": false,
            "IamInstanceProfile": profile.reference(),
            "NetworkInterfaces": [network_interface],
            "Tags": [{ "Key": "Name", "Value": instance_name }],
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(bucket: Option<&str>) -> crate::template::Template {
        let mut stack = Stack::new("postbox-dev");
        let network = NetworkWrapper::build(&mut stack).unwrap();
        BastionWrapper::build(&mut stack, &network, bucket).unwrap();
        stack.synth().unwrap()
    }

    #[test]
    fn test_instance_sits_in_public_subnet_with_public_ip() {
        let template = build(None);
        let instance = template.resource("PostboxDevBastionInstance").unwrap();
        let interface = &instance["Properties"]["NetworkInterfaces"][0];
        assert_eq!(interface["AssociatePublicIpAddress"], true);
        assert_eq!(
            interface["SubnetId"],
            serde_json::json!({ "Ref": "PostboxDevBastionSubnet1" })
        );
        assert_eq!(instance["Properties"]["AvailabilityZone"], "ap-northeast-1a");
    }

    #[test]
    fn test_role_is_ssm_managed() {
        let template = build(None);
        let role = template.resource("PostboxDevBastionRole").unwrap();
        assert_eq!(
            role["Properties"]["ManagedPolicyArns"][0],
            "arn:aws:iam::aws:policy/AmazonSSMManagedInstanceCore"
        );
        assert!(role["Properties"].get("Policies").is_none());
    }

    #[test]
    fn test_log_bucket_grants_are_optional() {
        let template = build(Some("postbox-session-logs"));
        let role = template.resource("PostboxDevBastionRole").unwrap();
        let statements = role["Properties"]["Policies"][0]["PolicyDocument"]["Statement"]
            .as_array()
            .unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0]["Resource"],
            "arn:aws:s3:::postbox-session-logs/*"
        );
    }
}
